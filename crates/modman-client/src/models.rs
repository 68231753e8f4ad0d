//! Wire types for the Model Manager API.

use serde::Deserialize;

/// One version of a remote model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersion {
    /// Remote version identifier.
    pub id: u64,
    /// Version name (e.g. "v2").
    pub name: String,
    /// Base model this version targets, when it overrides the model's.
    #[serde(default)]
    pub base_model: Option<String>,
    /// Whether the service holds the binary and can serve a download.
    #[serde(default)]
    pub is_local: bool,
}

/// A remote model, optionally with its versions included.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Remote model identifier.
    pub id: u64,
    /// Model name.
    pub name: String,
    /// Base model, the fallback for versions that omit their own.
    #[serde(default)]
    pub base_model: Option<String>,
    /// Versions, present when the listing was requested with
    /// `include=versions`.
    #[serde(default)]
    pub versions: Option<Vec<ModelVersion>>,
}

/// One page of the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsPage {
    /// Models on this page.
    #[serde(default)]
    pub items: Vec<Model>,
    /// Whether the server has further pages.
    #[serde(default)]
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_parses_camel_case_fields() {
        let model: Model = serde_json::from_value(json!({
            "id": 42,
            "name": "Forest Painter",
            "baseModel": "SDXL",
            "versions": [
                {"id": 7, "name": "v1", "isLocal": true},
                {"id": 8, "name": "v2", "baseModel": "SDXL Turbo", "isLocal": false}
            ]
        }))
        .unwrap();

        assert_eq!(model.id, 42);
        assert_eq!(model.base_model.as_deref(), Some("SDXL"));

        let versions = model.versions.unwrap();
        assert!(versions[0].is_local);
        assert_eq!(versions[0].base_model, None);
        assert!(!versions[1].is_local);
        assert_eq!(versions[1].base_model.as_deref(), Some("SDXL Turbo"));
    }

    #[test]
    fn missing_version_flags_default_to_false() {
        let version: ModelVersion =
            serde_json::from_value(json!({"id": 1, "name": "v1"})).unwrap();
        assert!(!version.is_local);
    }

    #[test]
    fn model_tolerates_absent_versions() {
        let model: Model = serde_json::from_value(json!({"id": 1, "name": "Bare"})).unwrap();
        assert_eq!(model.versions, None);
    }

    #[test]
    fn page_defaults_apply_when_fields_are_absent() {
        let page: ModelsPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }
}
