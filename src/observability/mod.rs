//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Admission handler and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, text or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from tower-http into every handler log line
//! - Metrics are cheap and off unless an address is configured

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{init_metrics, record_admission, Outcome};
