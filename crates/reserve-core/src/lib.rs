//! reserve-core - Core library for the payroll reserve tracker
//!
//! This crate contains the shared models, the local key-value store, the
//! JSONBin-backed cloud sync, and the record/user service used by every
//! reserve interface.

pub mod error;
pub mod export;
pub mod models;
pub mod scope;
pub mod services;
pub mod state;
pub mod storage;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{CloudConfig, Line, Record, RecordId, RecordStatus, Role, User, UserId};
