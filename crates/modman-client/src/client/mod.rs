//! Model Manager client: connection lifecycle and the shared request path.

mod catalog;
mod download;
mod upload;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use modman_core::{CatalogEntry, Category, ConfigStore};

use crate::error::{ClientError, ClientResult};
use crate::http::{ApiRequest, HttpBackend, HttpResponse, ReqwestBackend, StreamedResponse};
use crate::url::build_probe_url;

// ============================================================================
// Timeouts
// ============================================================================

/// Timeout for the bounded connect probe.
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for ordinary API requests.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for model downloads.
pub(crate) const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for image uploads.
pub(crate) const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Progress callback invoked with (bytes so far, total bytes).
pub type ProgressCallback<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Default client over the reqwest backend.
pub type DefaultModmanClient = ModmanClient<ReqwestBackend>;

/// Stored credentials plus the probe-validated flag.
#[derive(Debug, Clone, Default)]
struct AuthState {
    api_url: Option<String>,
    api_key: Option<String>,
    validated: bool,
}

/// Client for the Model Manager service.
///
/// Owns the stored credentials, the per-category catalog cache, and the
/// download cache directory. All methods take `&self`; the client is meant
/// to live in an `Arc` shared across host tasks. Generic over the HTTP
/// backend so tests run without a network; production code uses
/// [`DefaultModmanClient`].
pub struct ModmanClient<B: HttpBackend> {
    backend: B,
    config_store: ConfigStore,
    cache_dir: PathBuf,
    /// Serializes connect/disconnect sequences; held across the probe so
    /// concurrent transitions cannot interleave.
    transition: tokio::sync::Mutex<()>,
    /// Credentials and validation flag. Never held across an await.
    auth: Mutex<AuthState>,
    /// Expanded catalog per category. Never held across an await.
    catalog: Mutex<HashMap<Category, Vec<CatalogEntry>>>,
    /// Change token; bumps on connect, disconnect, and refresh.
    generation: AtomicU64,
}

impl ModmanClient<ReqwestBackend> {
    /// Create a client over reqwest.
    pub fn new(config_store: ConfigStore, cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_backend(ReqwestBackend::new(), config_store, cache_dir)
    }
}

impl<B: HttpBackend> ModmanClient<B> {
    /// Create a client with a custom backend.
    pub fn with_backend(
        backend: B,
        config_store: ConfigStore,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            config_store,
            cache_dir: cache_dir.into(),
            transition: tokio::sync::Mutex::new(()),
            auth: Mutex::new(AuthState::default()),
            catalog: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    // ========================================================================
    // Connection lifecycle
    // ========================================================================

    /// Validate credentials against the service and store them.
    ///
    /// The URL is normalized (trailing slash trimmed) and both inputs must be
    /// non-empty. A bounded probe (list one model, short timeout) validates
    /// the pair before anything is stored, so a failed connect leaves a
    /// previously working session untouched. On success the catalog cache is
    /// cleared, the generation counter bumps, and the credentials are written
    /// to the configuration when `persist` is set.
    pub async fn connect(&self, api_url: &str, api_key: &str, persist: bool) -> ClientResult<()> {
        let _transition = self.transition.lock().await;

        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if api_url.is_empty() {
            return Err(ClientError::MissingApiUrl);
        }
        if api_key.is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let probe = ApiRequest::get(build_probe_url(&api_url)?, api_key, PROBE_TIMEOUT);
        let response = self.backend.request(&probe).await?;
        match response.status {
            401 => return Err(ClientError::InvalidApiKey),
            403 => return Err(ClientError::AccessDenied),
            _ if !response.is_success() => return Err(error_from_body(&response)),
            _ => {}
        }

        {
            let mut auth = self.auth.lock().unwrap();
            auth.api_url = Some(api_url.clone());
            auth.api_key = Some(api_key.to_string());
            auth.validated = true;
        }
        self.catalog.lock().unwrap().clear();
        self.bump_generation();

        if persist {
            self.persist_credentials(&api_url, api_key);
        }

        tracing::info!(api_url = %api_url, persist, "Connected to Model Manager");
        Ok(())
    }

    /// Drop credentials and invalidate cached state. Idempotent; the cleared
    /// state is always persisted.
    pub async fn disconnect(&self) {
        let _transition = self.transition.lock().await;

        *self.auth.lock().unwrap() = AuthState::default();
        self.catalog.lock().unwrap().clear();
        self.bump_generation();
        self.persist_credentials("", "");

        tracing::info!("Disconnected from Model Manager");
    }

    /// Whether credentials are stored and still validated. A 401 on any live
    /// request clears this until the next successful connect.
    pub fn authenticated(&self) -> bool {
        let auth = self.auth.lock().unwrap();
        auth.api_url.is_some() && auth.api_key.is_some() && auth.validated
    }

    /// Currently stored service URL.
    pub fn api_url(&self) -> Option<String> {
        self.auth.lock().unwrap().api_url.clone()
    }

    /// Change token for host-side cache invalidation; increases on connect,
    /// disconnect, and refresh.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Root of the local download cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    // ========================================================================
    // Shared request path
    // ========================================================================

    /// Stored credentials, or `NotConnected`.
    fn credentials(&self) -> ClientResult<(String, String)> {
        let auth = self.auth.lock().unwrap();
        match (&auth.api_url, &auth.api_key) {
            (Some(url), Some(key)) => Ok((url.clone(), key.clone())),
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Stored credentials, additionally requiring the validated flag.
    fn validated_credentials(&self) -> ClientResult<(String, String)> {
        let auth = self.auth.lock().unwrap();
        match (&auth.api_url, &auth.api_key) {
            (Some(url), Some(key)) if auth.validated => Ok((url.clone(), key.clone())),
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Execute a buffered request and classify the response.
    pub(crate) async fn send(&self, request: ApiRequest) -> ClientResult<HttpResponse> {
        let response = self.backend.request(&request).await?;
        self.classify(response)
    }

    /// Execute a streaming request. Classification is by status only; the
    /// body is a stream and cannot be inspected for an error message.
    pub(crate) async fn send_stream(&self, request: ApiRequest) -> ClientResult<StreamedResponse> {
        let response = self.backend.request_stream(&request).await?;
        match response.status {
            401 => {
                self.demote();
                Err(ClientError::InvalidApiKey)
            }
            403 => Err(ClientError::AccessDenied),
            status if !response.is_success() => Err(ClientError::Api {
                status,
                message: "streaming request failed".to_string(),
            }),
            _ => Ok(response),
        }
    }

    /// Map a buffered response to a result, demoting the session on 401.
    pub(crate) fn classify(&self, response: HttpResponse) -> ClientResult<HttpResponse> {
        match response.status {
            401 => {
                self.demote();
                Err(ClientError::InvalidApiKey)
            }
            403 => Err(ClientError::AccessDenied),
            _ if !response.is_success() => Err(error_from_body(&response)),
            _ => Ok(response),
        }
    }

    /// A 401 on a live request invalidates the session until the next
    /// successful connect. Credentials stay in place for error reporting;
    /// the generation counter is left alone.
    fn demote(&self) {
        let mut auth = self.auth.lock().unwrap();
        if auth.validated {
            auth.validated = false;
            tracing::warn!("API key rejected; session demoted until reconnect");
        }
    }

    /// Drop every cached category; called by the catalog operations.
    pub(crate) fn clear_catalog(&self) {
        self.catalog.lock().unwrap().clear();
    }

    /// Cached entries for a category, if present.
    pub(crate) fn cached_entries(&self, category: Category) -> Option<Vec<CatalogEntry>> {
        self.catalog.lock().unwrap().get(&category).cloned()
    }

    /// Insert the expanded entries for a category.
    pub(crate) fn cache_entries(&self, category: Category, entries: Vec<CatalogEntry>) {
        self.catalog.lock().unwrap().insert(category, entries);
    }

    pub(crate) fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    /// Write the connection fields to the configuration, keeping the stored
    /// cache directory. Failures are logged inside the store.
    fn persist_credentials(&self, api_url: &str, api_key: &str) {
        let mut config = self.config_store.load();
        config.api_url = api_url.to_string();
        config.api_key = api_key.to_string();
        self.config_store.save(&config);
    }
}

/// Build an API error from a non-success buffered response, preferring the
/// JSON `error` field over raw body text.
fn error_from_body(response: &HttpResponse) -> ClientError {
    let message = serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| String::from_utf8_lossy(&response.body).trim().to_string());

    ClientError::Api {
        status: response.status,
        message,
    }
}
