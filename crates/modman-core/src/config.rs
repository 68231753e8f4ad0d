//! Persisted connection configuration.
//!
//! Settings live in a single JSON mapping (`config.json`) under the data
//! root. Environment variables override file values at load time, and an
//! explicit runtime connect overrides both. Read and write failures are
//! non-fatal: the client must come up with defaults rather than refuse to
//! start over a broken file.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::{PathError, data_root};

/// File name of the persisted configuration under the data root.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable overriding the service URL.
pub const ENV_API_URL: &str = "MODMAN_API_URL";

/// Environment variable overriding the API key.
pub const ENV_API_KEY: &str = "MODMAN_API_KEY";

/// Persisted connection settings. Empty strings mean "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Base URL of the Model Manager service.
    pub api_url: String,
    /// Bearer key used to authenticate against the service.
    pub api_key: String,
    /// Optional explicit cache directory.
    pub cache_dir: String,
}

/// Loads and saves [`FileConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store bound to an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard location under the data root.
    pub fn default_location() -> Result<Self, PathError> {
        Ok(Self::at(data_root()?.join(CONFIG_FILE_NAME)))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the configuration, overlaying environment variables.
    ///
    /// A missing file yields defaults. An unreadable or malformed file also
    /// yields defaults, with a warning. `MODMAN_API_URL` and `MODMAN_API_KEY`
    /// take precedence over file values when set and non-empty.
    pub fn load(&self) -> FileConfig {
        let mut config = self.read_file();

        if let Some(url) = non_empty_env(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(key) = non_empty_env(ENV_API_KEY) {
            config.api_key = key;
        }

        config
    }

    /// Write the configuration back, creating parent directories as needed.
    ///
    /// Failures are logged and swallowed; a read-only config location must
    /// never take the client down.
    pub fn save(&self, config: &FileConfig) {
        if let Err(e) = self.try_save(config) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist configuration"
            );
        }
    }

    fn read_file(&self) -> FileConfig {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return FileConfig::default(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read configuration, using defaults"
                );
                return FileConfig::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Malformed configuration, using defaults"
                );
                FileConfig::default()
            }
        }
    }

    fn try_save(&self, config: &FileConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ENV_LOCK, EnvVarGuard};

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::at(dir.path().join(CONFIG_FILE_NAME))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _url = EnvVarGuard::unset(ENV_API_URL);
        let _key = EnvVarGuard::unset(ENV_API_KEY);
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(store_in(&dir).load(), FileConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _url = EnvVarGuard::unset(ENV_API_URL);
        let _key = EnvVarGuard::unset(ENV_API_KEY);
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let config = FileConfig {
            api_url: "https://models.example.com".to_string(),
            api_key: "secret".to_string(),
            cache_dir: String::new(),
        };
        store.save(&config);

        assert_eq!(store.load(), config);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _url = EnvVarGuard::unset(ENV_API_URL);
        let _key = EnvVarGuard::unset(ENV_API_KEY);
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.load(), FileConfig::default());
    }

    #[test]
    fn partial_file_fills_missing_keys_with_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _url = EnvVarGuard::unset(ENV_API_URL);
        let _key = EnvVarGuard::unset(ENV_API_KEY);
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"api_url": "https://only-url.example.com"}"#).unwrap();

        let config = store.load();
        assert_eq!(config.api_url, "https://only-url.example.com");
        assert!(config.api_key.is_empty());
        assert!(config.cache_dir.is_empty());
    }

    #[test]
    fn env_values_override_file_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&FileConfig {
            api_url: "https://from-file.example.com".to_string(),
            api_key: "file-key".to_string(),
            cache_dir: "/tmp/cache".to_string(),
        });

        let _url = EnvVarGuard::set(ENV_API_URL, "https://from-env.example.com");
        let _key = EnvVarGuard::set(ENV_API_KEY, "env-key");

        let config = store.load();
        assert_eq!(config.api_url, "https://from-env.example.com");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.cache_dir, "/tmp/cache");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _key = EnvVarGuard::unset(ENV_API_KEY);
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&FileConfig {
            api_url: "https://from-file.example.com".to_string(),
            ..FileConfig::default()
        });

        let _url = EnvVarGuard::set(ENV_API_URL, "  ");

        assert_eq!(store.load().api_url, "https://from-file.example.com");
    }

    #[test]
    fn save_failure_is_swallowed() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _url = EnvVarGuard::unset(ENV_API_URL);
        let _key = EnvVarGuard::unset(ENV_API_KEY);
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();

        let store = ConfigStore::at(blocker.join(CONFIG_FILE_NAME));
        store.save(&FileConfig::default());

        assert_eq!(store.load(), FileConfig::default());
    }
}
