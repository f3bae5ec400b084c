//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the admission and liveness handlers
//! - Wire up middleware (request ID, tracing, body limit)
//! - Serve over TLS with axum-server
//! - Abort a connection whose request outlives the request timeout
//! - Drain in-flight requests on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{any, post},
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use thiserror::Error;
use tokio::sync::broadcast;
use tower::{make::Shared, timeout::Timeout};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::WebhookConfig;
use crate::health::{healthz, HEALTHZ_PATH};
use crate::http::validate::{validate, AppState};
use crate::policy::PolicyEvaluator;

/// Path the API server posts admission reviews to.
pub const VALIDATE_PATH: &str = "/validate";

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to serve on {addr}: {source}")]
    Serve {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// The router behind the request deadline. An expired request fails the
/// service call, so hyper drops the connection without writing a response.
pub type WebhookService = Timeout<Router>;

/// HTTPS server for the admission webhook.
pub struct WebhookServer {
    router: Router,
    config: WebhookConfig,
}

impl WebhookServer {
    /// Create a server enforcing the default policy set.
    pub fn new(config: WebhookConfig) -> Self {
        Self::with_evaluator(config, PolicyEvaluator::default())
    }

    /// Create a server enforcing `evaluator`.
    pub fn with_evaluator(config: WebhookConfig, evaluator: PolicyEvaluator) -> Self {
        let state = AppState {
            evaluator: Arc::new(evaluator),
            max_body_bytes: config.limits.max_request_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &WebhookConfig, state: AppState) -> Router {
        Router::new()
            .route(VALIDATE_PATH, post(validate))
            .route(HEALTHZ_PATH, any(healthz))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_request_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the handlers without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The router with the request deadline applied, as served.
    pub fn service(&self) -> WebhookService {
        Timeout::new(
            self.router.clone(),
            Duration::from_secs(self.config.timeouts.request_secs),
        )
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, then drain in-flight requests for up to
    /// the configured grace period.
    pub async fn run(
        self,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = self.config.serving.socket_addr();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);

        let handle = Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
            drain.graceful_shutdown(Some(grace));
        });

        tracing::info!(address = %addr, "Webhook server listening with TLS");

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(Shared::new(self.service()))
            .await
            .map_err(|source| ServerError::Serve { addr, source })?;

        tracing::info!("Webhook server stopped");
        Ok(())
    }
}
