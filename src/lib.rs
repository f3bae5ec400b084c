//! Validating admission webhook for VirtualService routing resources.

pub mod admission;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod mesh;
pub mod net;
pub mod observability;
pub mod policy;

pub use config::WebhookConfig;
pub use http::WebhookServer;
pub use lifecycle::Shutdown;
pub use policy::{Decision, PolicyEvaluator};
