//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_signal returns
//!
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber wakes
//!     → server stops accepting → drains in-flight requests → exits 0
//! ```
//!
//! # Design Decisions
//! - Startup is linear in main: config, logging, metrics, certificates, serve
//! - Shutdown has a deadline: in-flight requests get a bounded grace period

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
