//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.uniscrape/config.json`).
//! A missing file means defaults, so the binary runs with no setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Deribit endpoint settings.
    #[serde(default)]
    pub deribit: DeribitConfig,

    /// Received-frame sink settings.
    #[serde(default)]
    pub sink: SinkConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the control-plane HTTP server (default 8642).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    8642
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Deribit endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeribitConfig {
    /// WebSocket endpoint for the public API.
    #[serde(default = "default_deribit_url")]
    pub url: String,
}

fn default_deribit_url() -> String {
    crate::deribit::DEFAULT_WS_URL.to_string()
}

impl Default for DeribitConfig {
    fn default() -> Self {
        Self {
            url: default_deribit_url(),
        }
    }
}

/// Received-frame sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkConfig {
    /// File receiving one raw frame per line (default "output.jsonl").
    #[serde(default = "default_sink_path")]
    pub path: PathBuf,
}

fn default_sink_path() -> PathBuf {
    PathBuf::from("output.jsonl")
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            path: default_sink_path(),
        }
    }
}

/// Resolve config path from env or default (~/.uniscrape/config.json).
pub fn default_config_path() -> PathBuf {
    std::env::var("UNISCRAPE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".uniscrape").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default). Missing file => defaults.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.gateway.port, 8642);
        assert_eq!(config.gateway.bind, "127.0.0.1");
        assert_eq!(config.deribit.url, "wss://www.deribit.com/ws/api/v2");
        assert_eq!(config.sink.path, PathBuf::from("output.jsonl"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = serde_json::from_str(r#"{"gateway": {"port": 9000}}"#).unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.bind, "127.0.0.1");
        assert_eq!(config.deribit.url, "wss://www.deribit.com/ws/api/v2");
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let config =
            load_config(Some(PathBuf::from("/nonexistent/uniscrape-config.json"))).unwrap();
        assert_eq!(config.gateway.port, 8642);
    }
}
