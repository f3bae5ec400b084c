//! Network security subsystem.
//!
//! # Data Flow
//! ```text
//! WebhookConfig.tls
//!     → tls.rs (supplied pair, or self-signed fallback in cert_dir)
//!     → RustlsConfig (handed to the server)
//!     → cert_watcher.rs (reload a supplied pair when its files change)
//! ```
//!
//! # Design Decisions
//! - Certificate material is prepared once at startup; a bad pair is fatal
//! - Reloads swap the live config in place, so open connections are untouched

pub mod cert_watcher;
pub mod tls;

pub use cert_watcher::CertWatcher;
pub use tls::{load_tls_config, resolve_cert_pair, CertOrigin, CertPair, TlsError};
