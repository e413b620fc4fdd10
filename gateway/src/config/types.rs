use serde::{Deserialize, Serialize};
use std::time::Duration;
use trading_core::Symbol;

use crate::application::{GapPolicy, SessionConfig};
use crate::infrastructure::DEFAULT_SNAPSHOT_LIMIT;

/// Root configuration for the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigFile {
    pub exchange: ExchangeConfig,
    /// Symbols to mirror, one session each
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub session: SessionConfigJson,
}

/// Configuration for the venue serving snapshots and diff feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Unique identifier for the exchange (e.g., "binance")
    pub id: String,
    /// Display name
    pub name: String,
    /// REST API base URL
    pub rest_url: String,
    /// WebSocket URL
    pub ws_url: String,
    /// API key sent with snapshot requests
    #[serde(default)]
    pub api_key: String,
    /// Levels per side requested in a snapshot
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: u32,
}

/// Session configuration (JSON representation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfigJson {
    #[serde(default = "default_max_session_duration")]
    pub max_session_duration_ms: u64,
    #[serde(default = "default_report_interval")]
    pub report_interval_ms: u64,
    /// Stop after this many applied diffs; unbounded when absent
    #[serde(default)]
    pub max_buffered_events: Option<usize>,
    #[serde(default = "default_close_grace")]
    pub close_grace_ms: u64,
    #[serde(default)]
    pub gap_policy: GapPolicy,
}

impl Default for SessionConfigJson {
    fn default() -> Self {
        SessionConfigJson {
            max_session_duration_ms: default_max_session_duration(),
            report_interval_ms: default_report_interval(),
            max_buffered_events: None,
            close_grace_ms: default_close_grace(),
            gap_policy: GapPolicy::default(),
        }
    }
}

impl SessionConfigJson {
    /// Convert to application-layer SessionConfig
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            max_session_duration: Duration::from_millis(self.max_session_duration_ms),
            report_interval: Duration::from_millis(self.report_interval_ms),
            max_buffered_events: self.max_buffered_events,
            close_grace: Duration::from_millis(self.close_grace_ms),
            gap_policy: self.gap_policy,
        }
    }
}

impl GatewayConfigFile {
    /// Configured symbols, normalized
    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols.iter().map(Symbol::new).collect()
    }
}

// Default value functions for serde
fn default_snapshot_limit() -> u32 {
    DEFAULT_SNAPSHOT_LIMIT
}

fn default_max_session_duration() -> u64 {
    15 * 60 * 1000
}

fn default_report_interval() -> u64 {
    30_000
}

fn default_close_grace() -> u64 {
    5_000
}
