//! Local persistence port.
//!
//! Every collection lives under one fixed key as a JSON document. A format
//! change gets a new key rather than a migration of the stored value.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Computes the next raw value from the current one. Returning an error
/// leaves the stored value untouched.
pub type RawUpdate<'a> = Box<dyn FnOnce(Option<String>) -> Result<String> + 'a>;

/// Fixed keys of the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Records,
    Users,
    SessionUser,
    CloudConfig,
}

impl StoreKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Records => "records_v1",
            Self::Users => "users_v1",
            Self::SessionUser => "session_user_v1",
            Self::CloudConfig => "cloud_config_v1",
        }
    }
}

/// Key-value byte store holding JSON documents.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw JSON stored under `key`
    fn get(&self, key: StoreKey) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn put(&self, key: StoreKey, value: &str) -> Result<()>;

    /// Remove `key`; missing keys are not an error
    fn remove(&self, key: StoreKey) -> Result<()>;

    /// Read, transform, and write `key` with no other write in between.
    ///
    /// `apply` must not call back into the store.
    fn update(&self, key: StoreKey, apply: RawUpdate<'_>) -> Result<()>;

    /// Deserialize the value under `key`
    fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`, replacing it in full
    fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.put(key, &raw)
    }

    /// Atomically load the value under `key` (default when missing), let
    /// `change` edit it, and save it back.
    ///
    /// Nothing is written when `change` fails.
    fn modify<T, O, F>(&self, key: StoreKey, change: F) -> Result<O>
    where
        Self: Sized,
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> Result<O>,
    {
        let mut output = None;
        self.update(
            key,
            Box::new(|raw: Option<String>| -> Result<String> {
                let mut value = match raw {
                    Some(raw) => serde_json::from_str(&raw)?,
                    None => T::default(),
                };
                output = Some(change(&mut value)?);
                Ok(serde_json::to_string(&value)?)
            }),
        )?;
        output.ok_or_else(|| Error::Database(format!("update of {} did not run", key.as_str())))
    }
}
