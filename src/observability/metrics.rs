//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webhook_admission_requests_total` (counter): admission calls by outcome
//! - `webhook_admission_duration_seconds` (histogram): handler latency by outcome
//!
//! Outcomes are `allowed`, `denied` and `error`. Without an installed
//! recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Result of one admission call, as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allowed,
    Denied,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allowed => "allowed",
            Outcome::Denied => "denied",
            Outcome::Error => "error",
        }
    }
}

/// Install the Prometheus recorder and its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one admission call that started at `start`.
pub fn record_admission(outcome: Outcome, start: Instant) {
    let label = outcome.as_str();
    metrics::counter!("webhook_admission_requests_total", "outcome" => label).increment(1);
    metrics::histogram!("webhook_admission_duration_seconds", "outcome" => label)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels() {
        assert_eq!(Outcome::Allowed.as_str(), "allowed");
        assert_eq!(Outcome::Denied.as_str(), "denied");
        assert_eq!(Outcome::Error.as_str(), "error");
    }

    #[test]
    fn recording_without_recorder_is_harmless() {
        record_admission(Outcome::Allowed, Instant::now());
    }
}
