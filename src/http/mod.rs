//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection (axum-server + rustls)
//!     → server.rs (request ID, trace span, timeout, body limit)
//!     → validate.rs (POST /validate: decode → extract → evaluate → encode)
//!     → health (ANY /healthz)
//!     → Send to client
//! ```

pub mod server;
pub mod validate;

pub use server::{ServerError, WebhookServer, WebhookService, VALIDATE_PATH};
pub use validate::{review, AdmissionError, AppState, Reviewed, X_REQUEST_ID};
