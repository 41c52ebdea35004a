//! Test doubles shared by the sync and service tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::remote::{RemoteDocument, RemoteError, RemoteStore};
use crate::models::{CloudConfig, Line, Record, RecordId, RecordStatus, UserId};
use crate::storage::{KeyValueStore, MemoryStore, StoreKey};

/// Scriptable in-memory remote document.
#[derive(Default)]
pub struct FakeRemote {
    pub document: Mutex<RemoteDocument>,
    pub fetches: AtomicUsize,
    pub pushes: AtomicUsize,
    pub fail_fetch: Mutex<Option<RemoteError>>,
    pub fail_push: Mutex<Option<RemoteError>>,
    /// Simulated round-trip latency of each fetch
    pub latency: Duration,
}

impl FakeRemote {
    pub fn with_document(document: RemoteDocument) -> Self {
        Self {
            document: Mutex::new(document),
            ..Self::default()
        }
    }

    pub fn slow(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst) + self.pushes.load(Ordering::SeqCst)
    }

    pub fn document(&self) -> RemoteDocument {
        self.document.lock().unwrap().clone()
    }
}

impl RemoteStore for FakeRemote {
    async fn fetch(&self, _config: &CloudConfig) -> Result<RemoteDocument, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(error) = self.fail_fetch.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.document.lock().unwrap().clone())
    }

    async fn push(
        &self,
        _config: &CloudConfig,
        document: &RemoteDocument,
    ) -> Result<(), RemoteError> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_push.lock().unwrap().clone() {
            return Err(error);
        }
        *self.document.lock().unwrap() = document.clone();
        Ok(())
    }
}

pub fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

pub fn record(id: &str, updated_at: DateTime<Utc>, payroll: u32) -> Record {
    Record {
        id: RecordId::from(id),
        company_name: format!("Company {id}"),
        total_employees: 200,
        estimated_new_payroll: payroll,
        estimated_landing_date: "2024-06-01".to_string(),
        cards_issued: 0,
        card_schedule: String::new(),
        last_visit_date: String::new(),
        probability: 60,
        progress_notes: String::new(),
        updated_at,
        updated_by_user_id: UserId::from("s_c1"),
        updated_by_name: "Liu".to_string(),
        department: "Corporate One".to_string(),
        line: Line::Corporate,
        status: RecordStatus::Following,
        history: Vec::new(),
    }
}

pub fn configured_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .save(StoreKey::CloudConfig, &CloudConfig::new("master-key", "bin-1"))
        .unwrap();
    store
}
