use std::io;

use reserve_core::sync::{RemoteError, SyncError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] reserve_core::Error),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No acting user. Run `reserve use <employee-id>` or pass --actor")]
    NoActor,
    #[error("Unknown employee id: {0}")]
    UnknownEmployee(String),
    #[error("Record ID cannot be empty")]
    EmptyRecordId,
    #[error("Record not found for id/prefix: {0}")]
    RecordNotFound(String),
    #[error("{0}")]
    AmbiguousRecordId(String),
    #[error("A record for this company already exists ({0}); use --force to add anyway")]
    DuplicateCompany(String),
    #[error("Only an admin can manage users")]
    AdminRequired,
    #[error("Nothing to update; pass at least one field")]
    EmptyPatch,
    #[error(
        "Cloud sync is not configured. Run `reserve config set --api-key <KEY> --bin-id <ID>`."
    )]
    SyncNotConfigured,
}
