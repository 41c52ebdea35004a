//! Cloud sync for the shared remote document.
//!
//! The protocol is read-merge-write with no server coordination: fetch the
//! remote snapshot, merge it with the local collections, save the merge
//! locally, then push it back as the new canonical document.
//!
//! Known limitations, kept on purpose:
//! - deletes leave no tombstone, so a record deleted locally but still
//!   present remotely comes back on the next sync;
//! - record conflicts are decided by wall-clock `updated_at`, so clock skew
//!   between devices can pick the wrong winner;
//! - two devices pushing in the same window race, and the second push wins.

mod background;
mod merge;
mod remote;
mod synchronizer;
#[cfg(test)]
pub(crate) mod testing;

pub use background::{BackgroundSync, SyncTrigger};
pub use merge::{merge_records, merge_users};
pub use remote::{JsonBinClient, RemoteDocument, RemoteError, RemoteStore, DEFAULT_JSONBIN_URL};
pub use synchronizer::{SyncError, SyncOutcome, SyncReport, Synchronizer};
