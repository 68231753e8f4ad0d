//! Utilities for tests that touch process environment variables.

use std::env;
use std::sync::Mutex;

/// Serializes tests that read or write environment variables.
///
/// Configuration loading and path resolution consult `MODMAN_*` variables, so
/// every test that sets them, or that depends on them being unset, must hold
/// this lock:
///
/// ```ignore
/// let _guard = ENV_LOCK.lock().unwrap();
/// let _env = EnvVarGuard::set("MODMAN_DATA_DIR", "/tmp/test");
/// ```
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// RAII guard restoring an environment variable to its previous value on drop.
pub struct EnvVarGuard {
    key: String,
    previous: Option<String>,
}

impl EnvVarGuard {
    /// Set a variable, returning a guard that restores the old value.
    #[allow(unsafe_code)]
    pub fn set(key: &str, value: &str) -> Self {
        let previous = env::var(key).ok();
        unsafe {
            env::set_var(key, value);
        }
        Self {
            key: key.to_string(),
            previous,
        }
    }

    /// Remove a variable, returning a guard that restores the old value.
    #[allow(unsafe_code)]
    pub fn unset(key: &str) -> Self {
        let previous = env::var(key).ok();
        unsafe {
            env::remove_var(key);
        }
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvVarGuard {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        match &self.previous {
            Some(value) => unsafe {
                env::set_var(&self.key, value);
            },
            None => unsafe {
                env::remove_var(&self.key);
            },
        }
    }
}
