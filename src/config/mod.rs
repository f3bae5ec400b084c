//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (serde(default) on every section)
//!     → loader.rs (optional TOML file from --config)
//!     → cli.rs (flag overrides)
//!     → validation.rs (semantic checks)
//!     → WebhookConfig (validated, immutable)
//!     → consumed by server construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the request path never reads it directly
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{read_config, ConfigError};
pub use schema::{
    LimitsConfig, LogFormat, ObservabilityConfig, ServingConfig, TimeoutConfig, TlsConfig,
    WebhookConfig,
};
pub use validation::{validate_config, ValidationError};
