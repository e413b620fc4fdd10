use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use trading_core::{DepthSnapshotEvent, Symbol};

use crate::domain::{FetchError, SnapshotProvider};

/// Levels requested per side when no limit is configured
pub const DEFAULT_SNAPSHOT_LIMIT: u32 = 5000;

#[derive(Error, Debug)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {code} - {msg}")]
    Api { code: i32, msg: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convert infrastructure RestError to domain FetchError
impl From<RestError> for FetchError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Http(e) => FetchError::Network(e.to_string()),
            RestError::Api { code, msg } => FetchError::Api { code, message: msg },
            RestError::Parse(msg) => FetchError::Parse(msg),
        }
    }
}

/// REST API client for depth snapshots
/// Infrastructure component - handles HTTP communication
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    limit: u32,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        RestClient {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            limit: DEFAULT_SNAPSHOT_LIMIT,
        }
    }

    /// Send `X-MBX-APIKEY` with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Get order book depth snapshot
    pub async fn get_depth(&self, symbol: &Symbol) -> Result<DepthSnapshotEvent, RestError> {
        self.get(&self.depth_path(symbol)).await
    }

    fn depth_path(&self, symbol: &Symbol) -> String {
        format!("/api/v3/depth?symbol={}&limit={}", symbol, self.limit)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RestError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }

        let resp = request.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, RestError> {
        let status = resp.status();
        let text = resp.text().await?;
        decode_body(status, &text)
    }
}

fn decode_body<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    text: &str,
) -> Result<T, RestError> {
    if !status.is_success() {
        if let Ok(err) = serde_json::from_str::<ApiError>(text) {
            return Err(RestError::Api {
                code: err.code,
                msg: err.msg,
            });
        }
        return Err(RestError::Parse(format!("HTTP {}: {}", status, text)));
    }

    serde_json::from_str(text).map_err(|e| RestError::Parse(e.to_string()))
}

#[derive(Deserialize)]
struct ApiError {
    code: i32,
    msg: String,
}

/// Implement SnapshotProvider for RestClient (Dependency Inversion)
///
/// Converts infrastructure RestError to domain FetchError to maintain
/// proper dependency direction (infrastructure -> domain).
#[async_trait]
impl SnapshotProvider for RestClient {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<DepthSnapshotEvent, FetchError> {
        tracing::debug!(symbol = %symbol, limit = self.limit, "Requesting depth snapshot");
        self.get_depth(symbol).await.map_err(FetchError::from)
    }
}
