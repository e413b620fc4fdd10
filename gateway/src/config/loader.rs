use std::path::Path;
use thiserror::Error;

use super::types::GatewayConfigFile;

/// Environment variable naming a config file to load instead of the default
pub const CONFIG_PATH_ENV: &str = "DEPTH_GATEWAY_CONFIG";
/// Environment variable overriding `exchange.api_key`
pub const API_KEY_ENV: &str = "BINANCE_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("No symbols configured")]
    NoSymbols,
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Load gateway configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GatewayConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: GatewayConfigFile = serde_json::from_str(&content)?;
    Ok(config)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<GatewayConfigFile, ConfigError> {
    let config: GatewayConfigFile = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<GatewayConfigFile, ConfigError> {
    let default_config = include_str!("gateway_config.json");
    load_config_from_str(default_config)
}

impl GatewayConfigFile {
    /// Apply environment overrides (`BINANCE_API_KEY`)
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.exchange.api_key = key;
        }
    }

    /// Replace the configured symbols
    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if let Some(bad) = self
            .symbols
            .iter()
            .find(|s| s.trim().is_empty() || !s.trim().chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(ConfigError::InvalidSymbol(bad.clone()));
        }

        check_url("rest_url", &self.exchange.rest_url, &["http", "https"])?;
        check_url("ws_url", &self.exchange.ws_url, &["ws", "wss"])?;

        if self.exchange.snapshot_limit == 0 {
            return Err(ConfigError::ZeroValue("snapshot_limit"));
        }
        if self.session.max_session_duration_ms == 0 {
            return Err(ConfigError::ZeroValue("max_session_duration_ms"));
        }
        if self.session.report_interval_ms == 0 {
            return Err(ConfigError::ZeroValue("report_interval_ms"));
        }
        if self.session.max_buffered_events == Some(0) {
            return Err(ConfigError::ZeroValue("max_buffered_events"));
        }
        Ok(())
    }
}

fn check_url(field: &'static str, raw: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidUrl {
            field,
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    Ok(())
}
