//! Read-merge-write synchronizer

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::merge::{merge_records, merge_users};
use super::remote::{RemoteDocument, RemoteError, RemoteStore};
use crate::models::{CloudConfig, Record, User};
use crate::storage::{KeyValueStore, StoreKey};

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub merged_records: usize,
    pub merged_users: usize,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// No usable cloud configuration; nothing was sent.
    #[error("Cloud sync is not configured")]
    NotConfigured,
    /// Fetch failed; local state is untouched.
    #[error("Failed to fetch remote document: {0}")]
    FetchFailed(RemoteError),
    /// The merge is saved locally but the remote still holds the old document.
    #[error("Local data was merged and saved, but the remote push failed: {0}")]
    PushFailed(RemoteError),
    #[error("Local store error: {0}")]
    Store(String),
}

impl SyncError {
    /// Local and remote now disagree until the next successful sync.
    pub const fn is_partial_consistency(&self) -> bool {
        matches!(self, Self::PushFailed(_))
    }

    pub const fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}

impl From<crate::Error> for SyncError {
    fn from(error: crate::Error) -> Self {
        Self::Store(error.to_string())
    }
}

pub type SyncOutcome = Result<SyncReport, SyncError>;

/// Reconciles the local collections with the shared remote document.
///
/// Calls are not serialized; [`super::BackgroundSync`] provides the
/// single-flight gate for mutation-triggered runs.
pub struct Synchronizer<S, R> {
    store: Arc<S>,
    remote: Arc<R>,
}

impl<S, R> Clone for Synchronizer<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            remote: Arc::clone(&self.remote),
        }
    }
}

impl<S: KeyValueStore, R: RemoteStore> Synchronizer<S, R> {
    pub const fn new(store: Arc<S>, remote: Arc<R>) -> Self {
        Self { store, remote }
    }

    /// Run one fetch, merge, save, push cycle.
    pub async fn sync(&self) -> SyncOutcome {
        let config = self.usable_config()?;

        let remote = self
            .remote
            .fetch(&config)
            .await
            .map_err(SyncError::FetchFailed)?;

        tracing::debug!(
            remote_records = remote.records.len(),
            remote_users = remote.users.len(),
            "Merging remote document"
        );

        // Merge inside the store update so a concurrent local write is kept.
        let remote_records = remote.records;
        let records = self
            .store
            .modify(StoreKey::Records, |local: &mut Vec<Record>| {
                *local = merge_records(std::mem::take(local), remote_records);
                Ok(local.clone())
            })?;
        let remote_users = remote.users;
        let users = self
            .store
            .modify(StoreKey::Users, |local: &mut Vec<User>| {
                *local = merge_users(std::mem::take(local), remote_users);
                Ok(local.clone())
            })?;

        let synced_at = Utc::now();
        let report = SyncReport {
            merged_records: records.len(),
            merged_users: users.len(),
            synced_at,
        };
        let document = RemoteDocument {
            records,
            users,
            last_sync: Some(synced_at),
        };

        self.remote
            .push(&config, &document)
            .await
            .map_err(SyncError::PushFailed)?;

        Ok(report)
    }

    fn usable_config(&self) -> Result<CloudConfig, SyncError> {
        match self.store.load::<CloudConfig>(StoreKey::CloudConfig)? {
            Some(config) if config.is_usable() => Ok(config),
            _ => Err(SyncError::NotConfigured),
        }
    }
}
