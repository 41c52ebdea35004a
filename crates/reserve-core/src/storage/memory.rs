//! In-memory store, used by tests and throwaway sessions

use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, RawUpdate, StoreKey};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StoreKey, String>>> {
        self.values
            .lock()
            .map_err(|_| Error::Database("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        Ok(self.lock()?.get(&key).cloned())
    }

    fn put(&self, key: StoreKey, value: &str) -> Result<()> {
        self.lock()?.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        self.lock()?.remove(&key);
        Ok(())
    }

    fn update(&self, key: StoreKey, apply: RawUpdate<'_>) -> Result<()> {
        let mut values = self.lock()?;
        let next = apply(values.get(&key).cloned())?;
        values.insert(key, next);
        Ok(())
    }
}
