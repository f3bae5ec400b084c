//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the webhook.
//! All types derive Serde traits for deserialization from config files.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default name of the self-signed certificate pair.
pub const DEFAULT_PAIR_NAME: &str = "vs-vald-con";

/// Root configuration for the webhook.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    /// Listen address and port.
    pub serving: ServingConfig,

    /// Certificate material.
    pub tls: TlsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServingConfig {
    /// IP address to listen on.
    pub bind_address: IpAddr,

    /// HTTPS port.
    pub secure_port: u16,
}

impl ServingConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.secure_port)
    }
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            secure_port: 8443,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM certificate. When unset a self-signed pair is used.
    pub cert_file: Option<PathBuf>,

    /// PEM private key matching `cert_file`.
    pub private_key_file: Option<PathBuf>,

    /// Directory for the self-signed pair.
    pub cert_dir: PathBuf,

    /// File stem of the self-signed pair (`<pair_name>.crt`, `<pair_name>.key`).
    pub pair_name: String,

    /// Reload a supplied pair when the files change.
    pub watch_for_changes: bool,
}

impl TlsConfig {
    /// Both halves of a supplied pair, if configured.
    pub fn supplied_pair(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.cert_file, &self.private_key_file) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_file: None,
            private_key_file: None,
            cert_dir: PathBuf::from("apiserver.local.config/certificates"),
            pair_name: DEFAULT_PAIR_NAME.to_string(),
            watch_for_changes: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time for a request, first byte to completed response, in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum admission request body in bytes.
    pub max_request_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_body_bytes: 3 * 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter (trace, debug, info, warn, error or a directive list).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Prometheus endpoint bind address. Metrics are off when unset.
    pub metrics_address: Option<SocketAddr>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_address: None,
        }
    }
}
