//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::WebhookConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text. Missing sections take their defaults.
pub fn parse_config(content: &str) -> Result<WebhookConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read a TOML file. Semantic checks run later, once flags have been
/// layered on top.
pub fn read_config(path: &Path) -> Result<WebhookConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use crate::config::validation::validate_config;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.serving.secure_port, 8443);
        assert_eq!(config.tls.pair_name, "vs-vald-con");
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            [serving]
            secure_port = 9443

            [tls]
            cert_file = "/etc/webhook/certs/tls.crt"
            private_key_file = "/etc/webhook/certs/tls.key"

            [observability]
            log_format = "json"
            metrics_address = "0.0.0.0:9090"
            "#,
        )
        .unwrap();

        assert_eq!(config.serving.secure_port, 9443);
        assert_eq!(config.serving.bind_address.to_string(), "0.0.0.0");
        assert!(config.tls.supplied_pair().is_some());
        assert!(config.tls.watch_for_changes);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(
            config.observability.metrics_address.map(|a| a.port()),
            Some(9090)
        );
    }

    #[test]
    fn read_leaves_semantic_checks_to_the_caller() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits]\nmax_request_body_bytes = 0").unwrap();

        let config = read_config(file.path()).unwrap();
        assert_eq!(config.limits.max_request_body_bytes, 0);

        let err = ConfigError::Validation(validate_config(&config).unwrap_err());
        assert!(err.to_string().contains("max_request_body_bytes"));
    }

    #[test]
    fn read_reports_missing_file_and_bad_toml() {
        let err = read_config(Path::new("/nonexistent/webhook.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        assert!(matches!(
            parse_config("[serving]\nsecure_port = \"high\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
