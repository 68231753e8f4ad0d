//! Catalog entries produced by version expansion.

use serde::{Deserialize, Serialize};

/// One selectable catalog row: a (model, locally-available version) pair.
///
/// Produced by expanding the remote model listing. The client caches these
/// per category until the next connect, disconnect, or refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Remote model identifier.
    pub model_id: u64,
    /// Remote version identifier; absent for models without version data.
    pub version_id: Option<u64>,
    /// Name shown to the user. Models with several locally-available
    /// versions get "{model} - {version}" so the rows stay distinguishable.
    pub display_name: String,
    /// Remote model name.
    pub model_name: String,
    /// Remote version name; absent for models without version data.
    pub version_name: Option<String>,
    /// Base model this asset targets, version-level value preferred.
    pub base_model: Option<String>,
}
