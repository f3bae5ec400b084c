//! Command-line flags.
//!
//! Every flag is optional and overrides the matching field of the config
//! file (or the defaults when no file is given).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{LogFormat, WebhookConfig};
use crate::config::validation::validate_config;

#[derive(Debug, Default, Parser)]
#[command(name = "vs-admission-webhook")]
#[command(version, about = "Validating admission webhook for VirtualService routes", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// IP address to listen on
    #[arg(long)]
    pub bind_address: Option<IpAddr>,

    /// HTTPS port
    #[arg(long)]
    pub secure_port: Option<u16>,

    /// PEM certificate; a self-signed pair is used when absent
    #[arg(long, value_name = "FILE")]
    pub tls_cert_file: Option<PathBuf>,

    /// PEM private key matching --tls-cert-file
    #[arg(long, value_name = "FILE")]
    pub tls_private_key_file: Option<PathBuf>,

    /// Directory for the self-signed pair
    #[arg(long, value_name = "DIR")]
    pub cert_dir: Option<PathBuf>,

    /// File stem of the self-signed pair
    #[arg(long)]
    pub pair_name: Option<String>,

    /// Do not reload a supplied pair when its files change
    #[arg(long)]
    pub no_watch_certs: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Shutdown grace period in seconds
    #[arg(long)]
    pub shutdown_timeout_secs: Option<u64>,

    /// Maximum admission request body in bytes
    #[arg(long)]
    pub max_request_body_bytes: Option<usize>,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    pub metrics_bind_address: Option<SocketAddr>,

    /// Default log filter; RUST_LOG takes precedence
    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Build the effective configuration: file (or defaults), then flags.
    pub fn resolve(&self) -> Result<WebhookConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => WebhookConfig::default(),
        };
        self.apply(&mut config);

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, config: &mut WebhookConfig) {
        if let Some(addr) = self.bind_address {
            config.serving.bind_address = addr;
        }
        if let Some(port) = self.secure_port {
            config.serving.secure_port = port;
        }

        if let Some(path) = &self.tls_cert_file {
            config.tls.cert_file = Some(path.clone());
        }
        if let Some(path) = &self.tls_private_key_file {
            config.tls.private_key_file = Some(path.clone());
        }
        if let Some(dir) = &self.cert_dir {
            config.tls.cert_dir = dir.clone();
        }
        if let Some(name) = &self.pair_name {
            config.tls.pair_name = name.clone();
        }
        if self.no_watch_certs {
            config.tls.watch_for_changes = false;
        }

        if let Some(secs) = self.request_timeout_secs {
            config.timeouts.request_secs = secs;
        }
        if let Some(secs) = self.shutdown_timeout_secs {
            config.timeouts.shutdown_secs = secs;
        }
        if let Some(bytes) = self.max_request_body_bytes {
            config.limits.max_request_body_bytes = bytes;
        }

        if let Some(addr) = self.metrics_bind_address {
            config.observability.metrics_address = Some(addr);
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}
