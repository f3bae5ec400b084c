//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that a supplied TLS pair is complete
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WebhookConfig → Result<(), Vec<ValidationError>>
//! - Runs after file and flags are merged, before anything binds

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::WebhookConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("serving.secure_port must be non-zero")]
    ZeroPort,

    #[error("tls.cert_file and tls.private_key_file must be set together")]
    IncompleteTlsPair,

    #[error("tls.pair_name must not be empty")]
    EmptyPairName,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("limits.max_request_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.log_level `{0}` is not a valid filter")]
    InvalidLogLevel(String),
}

/// Check a merged configuration, collecting every problem found.
pub fn validate_config(config: &WebhookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.serving.secure_port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.tls.cert_file.is_some() != config.tls.private_key_file.is_some() {
        errors.push(ValidationError::IncompleteTlsPair);
    }
    if config.tls.pair_name.trim().is_empty() {
        errors.push(ValidationError::EmptyPairName);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.shutdown_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("shutdown_secs"));
    }

    if config.limits.max_request_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&WebhookConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = WebhookConfig::default();
        config.serving.secure_port = 0;
        config.timeouts.request_secs = 0;
        config.limits.max_request_body_bytes = 0;
        config.tls.cert_file = Some(PathBuf::from("/tmp/tls.crt"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort,
                ValidationError::IncompleteTlsPair,
                ValidationError::ZeroTimeout("request_secs"),
                ValidationError::ZeroBodyLimit,
            ]
        );
    }

    #[test]
    fn rejects_bad_log_filter_and_pair_name() {
        let mut config = WebhookConfig::default();
        config.observability.log_level = "vs=loud".to_string();
        config.tls.pair_name = " ".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyPairName));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidLogLevel(_))));
    }
}
