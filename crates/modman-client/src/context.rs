//! Process-level composition root.
//!
//! Hosts construct one [`ModmanContext`] at startup and hand its client to
//! every consumer. The context is an explicit value, not a hidden global:
//! tests build as many as they like, each with its own configuration and
//! cache.

use std::path::PathBuf;
use std::sync::Arc;

use modman_core::{ConfigStore, PathError, resolve_cache_dir};

use crate::client::DefaultModmanClient;

/// Location overrides for context construction.
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    /// Configuration file path; defaults to the standard data-root location.
    pub config_path: Option<PathBuf>,
    /// Cache root; defaults to the configured/host/local resolution chain.
    pub cache_dir: Option<PathBuf>,
}

/// One-per-process handle owning the configured client.
///
/// Construction loads the saved configuration, resolves the cache directory,
/// and, when the configuration already carries credentials, attempts a
/// best-effort connect: a failure is logged and the context comes up
/// disconnected instead of propagating the error.
pub struct ModmanContext {
    client: Arc<DefaultModmanClient>,
}

impl ModmanContext {
    /// Build the context, auto-connecting from saved configuration.
    pub async fn bootstrap(options: BootstrapOptions) -> Result<Self, PathError> {
        let store = match options.config_path {
            Some(path) => ConfigStore::at(path),
            None => ConfigStore::default_location()?,
        };
        let config = store.load();

        let explicit_cache = options.cache_dir.or_else(|| {
            let configured = config.cache_dir.trim();
            if configured.is_empty() {
                None
            } else {
                Some(PathBuf::from(configured))
            }
        });
        let cache = resolve_cache_dir(explicit_cache.as_deref())?;
        tracing::debug!(
            path = %cache.path.display(),
            source = ?cache.source,
            "Cache directory resolved"
        );

        let client = Arc::new(DefaultModmanClient::new(store, cache.path));

        if config.api_url.trim().is_empty() || config.api_key.trim().is_empty() {
            tracing::info!("No saved credentials; starting disconnected");
        } else {
            match client.connect(&config.api_url, &config.api_key, false).await {
                Ok(()) => tracing::info!("Auto-connected from saved configuration"),
                Err(e) => {
                    tracing::warn!(error = %e, "Auto-connect failed; starting disconnected");
                }
            }
        }

        Ok(Self { client })
    }

    /// Shared handle to the client.
    pub fn client(&self) -> Arc<DefaultModmanClient> {
        Arc::clone(&self.client)
    }
}
