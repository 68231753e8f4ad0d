//! Version expansion: remote models into catalog entries.

use modman_core::CatalogEntry;

use crate::models::Model;

/// Expand remote models into one catalog entry per locally-available version.
///
/// Versions the service cannot serve (`isLocal` false) are dropped. A model
/// whose version list is absent or empty still yields a single entry with no
/// version id, so older server responses stay selectable. When a model keeps
/// more than one local version, display names get a " - {version}" suffix to
/// stay distinguishable; a single survivor keeps the bare model name. A
/// version without its own base model inherits the model's. Input order is
/// preserved.
pub fn expand_versions(models: &[Model]) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();

    for model in models {
        if model.versions.as_deref().is_none_or(|v| v.is_empty()) {
            entries.push(CatalogEntry {
                model_id: model.id,
                version_id: None,
                display_name: model.name.clone(),
                model_name: model.name.clone(),
                version_name: None,
                base_model: model.base_model.clone(),
            });
            continue;
        }

        let local_versions: Vec<_> = model
            .versions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|v| v.is_local)
            .collect();

        let multiple = local_versions.len() > 1;
        for version in local_versions {
            let display_name = if multiple {
                format!("{} - {}", model.name, version.name)
            } else {
                model.name.clone()
            };
            entries.push(CatalogEntry {
                model_id: model.id,
                version_id: Some(version.id),
                display_name,
                model_name: model.name.clone(),
                version_name: Some(version.name.clone()),
                base_model: version
                    .base_model
                    .clone()
                    .or_else(|| model.base_model.clone()),
            });
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelVersion;

    fn version(id: u64, name: &str, is_local: bool) -> ModelVersion {
        ModelVersion {
            id,
            name: name.to_string(),
            base_model: None,
            is_local,
        }
    }

    fn model(id: u64, name: &str, versions: Option<Vec<ModelVersion>>) -> Model {
        Model {
            id,
            name: name.to_string(),
            base_model: None,
            versions,
        }
    }

    #[test]
    fn multiple_local_versions_get_suffixed_names() {
        let models = vec![model(
            1,
            "Foo",
            Some(vec![version(10, "v1", true), version(11, "v2", true)]),
        )];

        let entries = expand_versions(&models);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].display_name, "Foo - v1");
        assert_eq!(entries[1].display_name, "Foo - v2");
        assert_eq!(entries[0].version_id, Some(10));
        assert_eq!(entries[1].version_id, Some(11));
    }

    #[test]
    fn single_local_version_keeps_the_bare_name() {
        let models = vec![model(2, "Bar", Some(vec![version(5, "v1", true)]))];

        let entries = expand_versions(&models);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "Bar");
        assert_eq!(entries[0].version_name.as_deref(), Some("v1"));
    }

    #[test]
    fn remote_only_versions_are_dropped() {
        let models = vec![model(
            3,
            "Remote Only",
            Some(vec![version(9, "v1", false), version(10, "v2", false)]),
        )];

        assert!(expand_versions(&models).is_empty());
    }

    #[test]
    fn one_local_among_remote_versions_keeps_the_bare_name() {
        let models = vec![model(
            4,
            "Mixed",
            Some(vec![version(1, "v1", false), version(2, "v2", true)]),
        )];

        let entries = expand_versions(&models);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "Mixed");
        assert_eq!(entries[0].version_id, Some(2));
    }

    #[test]
    fn missing_version_data_yields_a_single_versionless_entry() {
        for versions in [None, Some(vec![])] {
            let models = vec![model(5, "Plain", versions)];

            let entries = expand_versions(&models);
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].version_id, None);
            assert_eq!(entries[0].version_name, None);
            assert_eq!(entries[0].display_name, "Plain");
        }
    }

    #[test]
    fn version_base_model_falls_back_to_the_model() {
        let mut own = version(1, "v1", true);
        own.base_model = Some("SDXL Turbo".to_string());
        let inherits = version(2, "v2", true);

        let mut parent = model(6, "Foo", Some(vec![own, inherits]));
        parent.base_model = Some("SDXL".to_string());

        let entries = expand_versions(&[parent]);
        assert_eq!(entries[0].base_model.as_deref(), Some("SDXL Turbo"));
        assert_eq!(entries[1].base_model.as_deref(), Some("SDXL"));
    }

    #[test]
    fn listing_order_is_preserved() {
        let models = vec![
            model(1, "A", Some(vec![version(1, "v1", true)])),
            model(2, "B", None),
            model(3, "C", Some(vec![version(2, "v1", true), version(3, "v2", true)])),
        ];

        let ids: Vec<u64> = expand_versions(&models).iter().map(|e| e.model_id).collect();
        assert_eq!(ids, [1, 2, 3, 3]);
    }
}
