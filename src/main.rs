//! VirtualService Admission Webhook
//!
//! Validates VirtualService create/update requests on behalf of the cluster
//! API server. A submission is rejected when it declares the same URI prefix
//! twice across its HTTP routes.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!                          │               ADMISSION WEBHOOK                  │
//!                          │                                                  │
//!   API server             │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   POST /validate ────────┼─▶│  net    │──▶│  http    │──▶│  admission   │   │
//!                          │  │  tls    │   │ validate │   │ decode_review│   │
//!                          │  └─────────┘   └──────────┘   └──────┬───────┘   │
//!                          │                                      ▼           │
//!                          │                               ┌──────────────┐   │
//!                          │                               │    mesh      │   │
//!                          │                               │ decode_object│   │
//!                          │                               │extract_routes│   │
//!                          │                               └──────┬───────┘   │
//!                          │                                      ▼           │
//!   AdmissionReview        │  ┌──────────┐                 ┌──────────────┐   │
//!   (allowed / denied) ◀───┼──│admission │◀────────────────│   policy     │   │
//!                          │  │ encode   │                 │ PrefixIndex  │   │
//!                          │  └──────────┘                 └──────────────┘   │
//!                          │                                                  │
//!                          │  config · lifecycle · observability · health     │
//!                          └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use vs_admission_webhook::config::Cli;
use vs_admission_webhook::http::WebhookServer;
use vs_admission_webhook::lifecycle::Shutdown;
use vs_admission_webhook::net::{load_tls_config, resolve_cert_pair, CertOrigin, CertWatcher};
use vs_admission_webhook::observability::{init_logging, init_metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.serving.socket_addr(),
        request_timeout_secs = config.timeouts.request_secs,
        max_request_body_bytes = config.limits.max_request_body_bytes,
        "vs-admission-webhook starting"
    );

    if let Some(addr) = config.observability.metrics_address {
        init_metrics(addr)?;
    }

    let pair = resolve_cert_pair(&config.tls, &config.serving)?;
    let tls = load_tls_config(&pair).await?;

    let _watcher = if pair.origin == CertOrigin::Supplied && config.tls.watch_for_changes {
        Some(CertWatcher::new(&pair.cert_path, &pair.key_path, tls.clone()).run()?)
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let server = WebhookServer::new(config);
    server.run(tls, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
