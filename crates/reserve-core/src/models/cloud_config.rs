//! Cloud sync configuration stored per device

use serde::{Deserialize, Serialize};

use crate::util::non_blank;

/// Shared remote-document descriptor.
///
/// Every device that should see the same data must carry the same key and
/// bin id.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfig {
    #[serde(default)]
    pub enabled: bool,
    /// JSONBin master key, sent as `X-Master-Key`
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub bin_id: String,
}

impl std::fmt::Debug for CloudConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CloudConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &"[REDACTED]")
            .field("bin_id", &self.bin_id)
            .finish()
    }
}

impl CloudConfig {
    pub fn new(api_key: impl Into<String>, bin_id: impl Into<String>) -> Self {
        Self {
            enabled: true,
            api_key: api_key.into(),
            bin_id: bin_id.into(),
        }
    }

    /// True when sync may run: enabled with a non-blank key and bin id.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key().is_some() && self.bin_id().is_some()
    }

    pub fn api_key(&self) -> Option<String> {
        non_blank(&self.api_key)
    }

    pub fn bin_id(&self) -> Option<String> {
        non_blank(&self.bin_id)
    }

    /// Trim stored values.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.api_key = self.api_key.trim().to_string();
        self.bin_id = self.bin_id.trim().to_string();
        self
    }
}
