//! TLS configuration and certificate loading.
//!
//! # Responsibilities
//! - Verify a supplied certificate/key pair before serving with it
//! - Fall back to a self-signed pair under the certificate directory,
//!   reusing one left there by an earlier run
//! - Build the rustls configuration for axum-server

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use rcgen::{CertificateParams, DistinguishedName, DnType, DnValue, KeyPair};
use thiserror::Error;

use crate::config::{ServingConfig, TlsConfig};

/// Errors raised while preparing certificate material. All are fatal.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("{kind} file not found: {path:?}")]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("no PEM {kind} found in {path:?}")]
    EmptyPem { kind: &'static str, path: PathBuf },

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to generate self-signed certificate: {0}")]
    Generate(#[from] rcgen::Error),

    #[error("failed to build TLS configuration: {0}")]
    Config(#[source] std::io::Error),
}

/// Where a certificate pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertOrigin {
    /// Paths given by configuration.
    Supplied,
    /// Self-signed pair found in the certificate directory.
    Reused,
    /// Self-signed pair generated by this process.
    Generated,
}

/// Certificate and key paths ready to be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPair {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub origin: CertOrigin,
}

/// Decide which certificate pair to serve with, generating one if needed.
pub fn resolve_cert_pair(tls: &TlsConfig, serving: &ServingConfig) -> Result<CertPair, TlsError> {
    if let Some((cert, key)) = tls.supplied_pair() {
        verify_pem_pair(cert, key)?;
        return Ok(CertPair {
            cert_path: cert.clone(),
            key_path: key.clone(),
            origin: CertOrigin::Supplied,
        });
    }

    let cert_path = tls.cert_dir.join(format!("{}.crt", tls.pair_name));
    let key_path = tls.cert_dir.join(format!("{}.key", tls.pair_name));

    if cert_path.exists() && key_path.exists() {
        verify_pem_pair(&cert_path, &key_path)?;
        tracing::info!(cert = ?cert_path, "Reusing self-signed certificate");
        return Ok(CertPair {
            cert_path,
            key_path,
            origin: CertOrigin::Reused,
        });
    }

    let hosts = self_signed_hosts(serving.bind_address);
    let (cert_pem, key_pem) = generate_self_signed(&tls.pair_name, &hosts)?;

    fs::create_dir_all(&tls.cert_dir).map_err(|source| TlsError::Io {
        path: tls.cert_dir.clone(),
        source,
    })?;
    write_file(&cert_path, cert_pem.as_bytes(), 0o644)?;
    write_file(&key_path, key_pem.as_bytes(), 0o600)?;

    tracing::info!(cert = ?cert_path, hosts = ?hosts, "Generated self-signed certificate");
    Ok(CertPair {
        cert_path,
        key_path,
        origin: CertOrigin::Generated,
    })
}

/// Names and addresses a self-signed certificate is issued for.
pub fn self_signed_hosts(bind_address: IpAddr) -> Vec<String> {
    let mut hosts = vec!["localhost".to_string(), "127.0.0.1".to_string()];
    let addr = bind_address.to_string();
    if !hosts.contains(&addr) {
        hosts.push(addr);
    }
    hosts
}

/// Generate a self-signed certificate and key, both PEM encoded.
pub fn generate_self_signed(
    common_name: &str,
    hosts: &[String],
) -> Result<(String, String), TlsError> {
    let mut params = CertificateParams::new(hosts.to_vec())?;
    let mut dn = DistinguishedName::new();
    dn.push(
        DnType::CommonName,
        DnValue::Utf8String(format!("{}@{}", common_name, unix_now())),
    );
    params.distinguished_name = dn;

    let key_pair = KeyPair::generate()?;
    let cert = params.self_signed(&key_pair)?;

    Ok((cert.pem(), key_pair.serialize_pem()))
}

/// Check that both files exist and hold PEM material of the right type.
pub fn verify_pem_pair(cert_path: &Path, key_path: &Path) -> Result<(), TlsError> {
    let mut certs = open_pem(cert_path, "certificate")?;
    let found = rustls_pemfile::certs(&mut certs)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: cert_path.to_path_buf(),
            source,
        })?;
    if found.is_empty() {
        return Err(TlsError::EmptyPem {
            kind: "certificate",
            path: cert_path.to_path_buf(),
        });
    }

    let mut key = open_pem(key_path, "private key")?;
    let key = rustls_pemfile::private_key(&mut key).map_err(|source| TlsError::Io {
        path: key_path.to_path_buf(),
        source,
    })?;
    if key.is_none() {
        return Err(TlsError::EmptyPem {
            kind: "private key",
            path: key_path.to_path_buf(),
        });
    }

    Ok(())
}

/// Load TLS configuration from a resolved pair.
pub async fn load_tls_config(pair: &CertPair) -> Result<RustlsConfig, TlsError> {
    RustlsConfig::from_pem_file(&pair.cert_path, &pair.key_path)
        .await
        .map_err(TlsError::Config)
}

fn open_pem(path: &Path, kind: &'static str) -> Result<BufReader<File>, TlsError> {
    if !path.exists() {
        return Err(TlsError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| TlsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<(), TlsError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let to_io = |source| TlsError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = options.open(path).map_err(to_io)?;
    file.write_all(contents).map_err(to_io)
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
