//! Data models for the reserve tracker

mod cloud_config;
mod line;
mod record;
mod user;

pub use cloud_config::CloudConfig;
pub use line::Line;
pub use record::{HistoryEntry, Record, RecordDraft, RecordId, RecordPatch, RecordStatus};
pub use user::{Role, User, UserId};
