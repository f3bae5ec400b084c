//! Certificate file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Reloads the serving certificate when its files change.
///
/// The parent directories are watched rather than the files, since mounted
/// secrets are swapped through a symlink in the same directory.
pub struct CertWatcher {
    cert_path: PathBuf,
    key_path: PathBuf,
    tls: RustlsConfig,
}

impl CertWatcher {
    pub fn new(cert_path: &Path, key_path: &Path, tls: RustlsConfig) -> Self {
        Self {
            cert_path: cert_path.to_path_buf(),
            key_path: key_path.to_path_buf(),
            tls,
        }
    }

    /// Start watching. Keep the returned watcher alive for as long as reloads
    /// should happen.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        let _ = change_tx.send(());
                    }
                }
                Err(e) => tracing::error!(error = %e, "Certificate watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for dir in watch_dirs(&self.cert_path, &self.key_path) {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(cert = ?self.cert_path, key = ?self.key_path, "Certificate watcher started");
        tokio::spawn(self.reload_loop(change_rx));
        Ok(watcher)
    }

    /// Re-read the pair into the live TLS configuration. On failure the
    /// previous material stays in use.
    pub async fn reload(&self) -> std::io::Result<()> {
        self.tls
            .reload_from_pem_file(&self.cert_path, &self.key_path)
            .await
    }

    async fn reload_loop(self, mut changes: mpsc::UnboundedReceiver<()>) {
        while changes.recv().await.is_some() {
            // One secret update fires several events; settle before reloading.
            tokio::time::sleep(Duration::from_millis(500)).await;
            while changes.try_recv().is_ok() {}

            match self.reload().await {
                Ok(()) => tracing::info!(cert = ?self.cert_path, "Certificate reloaded"),
                Err(e) => tracing::error!(
                    error = %e,
                    "Failed to reload certificate. Keeping current material."
                ),
            }
        }
    }
}

fn watch_dirs(cert_path: &Path, key_path: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for path in [cert_path, key_path] {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}
