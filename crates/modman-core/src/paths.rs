//! Data-root and cache-directory resolution.
//!
//! The data root holds the persisted configuration; the cache root holds one
//! subdirectory per category with the downloaded model files.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable overriding the data root.
pub const ENV_DATA_DIR: &str = "MODMAN_DATA_DIR";

/// Environment variable pointing at the host's models directory.
pub const ENV_MODELS_DIR: &str = "MODMAN_MODELS_DIR";

/// Cache subfolder created inside a host-provided models directory.
pub const CACHE_SUBDIR_IN_MODELS: &str = "modman_cache";

/// Errors from path resolution and directory creation.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the platform data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },
}

/// How the cache directory was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDirSource {
    /// Explicit path from configuration or caller.
    Explicit,
    /// Host models directory plus the fixed cache subfolder.
    HostModelsDir,
    /// Local default under the data root.
    Default,
}

/// Result of resolving the cache directory.
#[derive(Debug, Clone)]
pub struct CacheDirResolution {
    /// The resolved cache root.
    pub path: PathBuf,
    /// Where the path came from.
    pub source: CacheDirSource,
}

/// Root directory for application data (configuration, default cache).
///
/// Resolution order:
/// 1. `MODMAN_DATA_DIR` environment variable
/// 2. Platform data directory (e.g. `~/.local/share/modman`), created on
///    demand
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(ENV_DATA_DIR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    let root = data_dir.join("modman");
    ensure_directory(&root)?;
    Ok(root)
}

/// Resolve the download-cache root.
///
/// Resolution order:
/// 1. Explicit path from configuration or caller
/// 2. `MODMAN_MODELS_DIR` joined with `modman_cache`
/// 3. `<data root>/cache`
pub fn resolve_cache_dir(explicit: Option<&Path>) -> Result<CacheDirResolution, PathError> {
    if let Some(path) = explicit {
        return Ok(CacheDirResolution {
            path: path.to_path_buf(),
            source: CacheDirSource::Explicit,
        });
    }

    if let Ok(models_dir) = env::var(ENV_MODELS_DIR) {
        if !models_dir.trim().is_empty() {
            return Ok(CacheDirResolution {
                path: PathBuf::from(models_dir).join(CACHE_SUBDIR_IN_MODELS),
                source: CacheDirSource::HostModelsDir,
            });
        }
    }

    Ok(CacheDirResolution {
        path: data_root()?.join("cache"),
        source: CacheDirSource::Default,
    })
}

/// Create a directory (and parents) if it does not already exist.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}
