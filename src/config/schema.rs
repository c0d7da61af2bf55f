//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a demo tier.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Primary listener (the service port).
    pub listener: ListenerConfig,

    /// Logging and scrape endpoint settings.
    pub observability: ObservabilityConfig,

    /// Identity of this tier and where the next one lives.
    pub tier: TierConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Service port. Overridden by `PORT`.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, one event per line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Serve the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Bind address of the scrape endpoint.
    pub metrics_address: String,

    /// Path the scrape endpoint answers on.
    pub metrics_path: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Fallback filter directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9464".to_string(),
            metrics_path: "/metrics".to_string(),
            log_format: LogFormat::Pretty,
            log_filter: "telemetry_demo=info,tower_http=info".to_string(),
        }
    }
}

/// Position of this process in the tier chain.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TierConfig {
    /// Tier name reported by `/chain` (e.g., "front", "middle", "backend").
    pub name: String,

    /// Base URL of the next tier (e.g., "http://127.0.0.1:8081").
    /// The last tier in the chain leaves this unset.
    pub downstream: Option<String>,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            name: "front".to_string(),
            downstream: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for a call to the downstream tier in seconds.
    pub downstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            downstream_secs: 5,
        }
    }
}
