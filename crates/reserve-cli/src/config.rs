//! Environment and path resolution.

use std::env;
use std::path::PathBuf;

use reserve_core::sync::DEFAULT_JSONBIN_URL;

pub const DB_PATH_ENV: &str = "RESERVE_DB_PATH";
pub const JSONBIN_URL_ENV: &str = "RESERVE_JSONBIN_URL";
pub const ACTOR_ENV: &str = "RESERVE_ACTOR";

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reserve")
        .join("reserve.db")
}

/// Explicit actor from the flag, falling back to the environment.
pub fn resolve_actor(cli_actor: Option<String>) -> Option<String> {
    first_non_blank(cli_actor, env::var(ACTOR_ENV).ok())
}

pub fn jsonbin_base_url() -> String {
    first_non_blank(env::var(JSONBIN_URL_ENV).ok(), None)
        .unwrap_or_else(|| DEFAULT_JSONBIN_URL.to_string())
}

pub fn first_non_blank(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
