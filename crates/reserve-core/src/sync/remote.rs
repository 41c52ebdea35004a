//! Remote document transport.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::models::{CloudConfig, Record, User};
use crate::util::{error_excerpt, has_http_scheme, non_blank};

pub const DEFAULT_JSONBIN_URL: &str = "https://api.jsonbin.io/v3";
const JSONBIN_HTTP_TIMEOUT_SECS: u64 = 30;
const MASTER_KEY_HEADER: &str = "X-Master-Key";

/// The shared document every device reads and rewrites in full.
///
/// Entries that fail to parse are skipped with a warning, and so are gone
/// from the next push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub records: Vec<Record>,
    #[serde(default, deserialize_with = "skip_malformed")]
    pub users: Vec<User>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!(index, "Skipping malformed remote entry: {error}");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote request failed: {0}")]
    Http(String),
    #[error("Remote store returned {0}")]
    Status(String),
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

/// Transport for the shared remote document.
pub trait RemoteStore: Send + Sync {
    /// Fetch the latest snapshot
    fn fetch(
        &self,
        config: &CloudConfig,
    ) -> impl Future<Output = Result<RemoteDocument, RemoteError>> + Send;

    /// Replace the remote document in full
    fn push(
        &self,
        config: &CloudConfig,
        document: &RemoteDocument,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// JSONBin v3 client.
#[derive(Clone)]
pub struct JsonBinClient {
    base_url: String,
    client: reqwest::Client,
}

impl JsonBinClient {
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(JSONBIN_HTTP_TIMEOUT_SECS))
            .build()?;
        Self::with_http_client(base_url, client)
    }

    /// Use a preconfigured HTTP client, e.g. one with proxies disabled.
    pub fn with_http_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self, RemoteError> {
        let base_url = normalize_base_url(&base_url.into())?;
        Ok(Self { base_url, client })
    }

    fn bin_url(&self, bin_id: &str) -> String {
        format!("{}/b/{}", self.base_url, urlencoding::encode(bin_id))
    }
}

impl RemoteStore for JsonBinClient {
    async fn fetch(&self, config: &CloudConfig) -> Result<RemoteDocument, RemoteError> {
        let (api_key, bin_id) = credentials(config)?;
        let url = format!("{}/latest", self.bin_url(&bin_id));

        let response = self
            .client
            .get(&url)
            .header(MASTER_KEY_HEADER, api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status(parse_api_error(status, &body)));
        }

        let body = response.text().await?;
        parse_latest_response(&body)
    }

    async fn push(&self, config: &CloudConfig, document: &RemoteDocument) -> Result<(), RemoteError> {
        let (api_key, bin_id) = credentials(config)?;

        let response = self
            .client
            .put(self.bin_url(&bin_id))
            .header(MASTER_KEY_HEADER, api_key)
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status(parse_api_error(status, &body)));
        }

        Ok(())
    }
}

/// Parse the `GET /b/{id}/latest` body, which wraps the document under `record`.
///
/// Public so callers can exercise parsing without network access.
pub fn parse_latest_response(body: &str) -> Result<RemoteDocument, RemoteError> {
    #[derive(Deserialize)]
    struct LatestResponse {
        record: Option<RemoteDocument>,
    }

    let payload: LatestResponse = serde_json::from_str(body)
        .map_err(|error| RemoteError::InvalidPayload(error.to_string()))?;
    payload.record.ok_or_else(|| {
        RemoteError::InvalidPayload("response did not include a record".to_string())
    })
}

#[derive(Debug, Deserialize)]
struct JsonBinErrorBody {
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<JsonBinErrorBody>(body) {
        if let Some(message) = payload.message {
            return format!("{} ({})", error_excerpt(&message), status.as_u16());
        }
    }

    let trimmed = error_excerpt(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn credentials(config: &CloudConfig) -> Result<(String, String), RemoteError> {
    let api_key = config
        .api_key()
        .ok_or_else(|| RemoteError::InvalidConfiguration("api key must not be empty".to_string()))?;
    let bin_id = config
        .bin_id()
        .ok_or_else(|| RemoteError::InvalidConfiguration("bin id must not be empty".to_string()))?;
    Ok((api_key, bin_id))
}

fn normalize_base_url(raw: &str) -> Result<String, RemoteError> {
    let base_url = non_blank(raw).ok_or_else(|| {
        RemoteError::InvalidConfiguration("base url must not be empty".to_string())
    })?;
    if has_http_scheme(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(RemoteError::InvalidConfiguration(
            "base url must include http:// or https://".to_string(),
        ))
    }
}
