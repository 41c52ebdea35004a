//! SQLite-backed key-value store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{KeyValueStore, RawUpdate, StoreKey};
use crate::error::{Error, Result};

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Local store backed by a single `SQLite` file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        tracing::debug!("Opened local store at {}", path.display());
        Self::from_connection(conn)
    }

    /// Open an in-memory store (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Database("local store lock poisoned".to_string()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        read_value(&*self.connection()?, key)
    }

    fn put(&self, key: StoreKey, value: &str) -> Result<()> {
        write_value(&*self.connection()?, key, value)
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key.as_str()])?;
        Ok(())
    }

    fn update(&self, key: StoreKey, apply: RawUpdate<'_>) -> Result<()> {
        let mut conn = self.connection()?;
        // Hold the write lock from the read onwards.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let next = apply(read_value(&tx, key)?)?;
        write_value(&tx, key, &next)?;
        tx.commit()?;
        Ok(())
    }
}

fn read_value(conn: &Connection, key: StoreKey) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key.as_str()],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

fn write_value(conn: &Connection, key: StoreKey, value: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp_millis();
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key.as_str(), value, now],
    )?;
    Ok(())
}

/// Run all pending migrations
fn migrate(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration to version 1: key-value table
fn migrate_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running local store migration to v{CURRENT_VERSION}");
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        ",
    )?;
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        params![1, chrono::Utc::now().timestamp_millis()],
    )?;
    Ok(())
}
