//! Model listing, the per-category catalog cache, and live detail fetches.

use modman_core::{CatalogEntry, Category};

use crate::error::ClientResult;
use crate::expand::expand_versions;
use crate::http::{ApiRequest, HttpBackend};
use crate::models::{Model, ModelsPage};
use crate::url::{build_model_detail_url, build_models_page_url};

use super::{ModmanClient, REQUEST_TIMEOUT};

/// Ceiling on listing pages, far above any realistic catalog; stops a server
/// that never clears `hasMore` from looping us forever.
const MAX_PAGES: u32 = 100;

impl<B: HttpBackend> ModmanClient<B> {
    /// Expanded catalog for one category.
    ///
    /// Served from the in-memory cache when present; otherwise the full
    /// listing is paginated, expanded per version, cached, and returned.
    /// The cache lives until the next connect, disconnect, or refresh.
    pub async fn list_models(&self, category: Category) -> ClientResult<Vec<CatalogEntry>> {
        if let Some(cached) = self.cached_entries(category) {
            return Ok(cached);
        }

        let (base, key) = self.credentials()?;

        let mut raw_models: Vec<Model> = Vec::new();
        let mut page = 1;
        loop {
            let url = build_models_page_url(&base, category, page)?;
            let response = self
                .send(ApiRequest::get(url, key.clone(), REQUEST_TIMEOUT))
                .await?;
            let models_page: ModelsPage = serde_json::from_slice(&response.body)?;

            raw_models.extend(models_page.items);

            if !models_page.has_more {
                break;
            }
            page += 1;

            if page > MAX_PAGES {
                tracing::warn!(
                    category = %category,
                    "Listing exceeded the page ceiling; returning a truncated catalog"
                );
                break;
            }
        }

        let entries = expand_versions(&raw_models);
        tracing::debug!(
            category = %category,
            models = raw_models.len(),
            entries = entries.len(),
            "Catalog populated"
        );

        self.cache_entries(category, entries.clone());
        Ok(entries)
    }

    /// Drop every cached category and bump the generation counter. The next
    /// `list_models` call repopulates lazily; nothing is fetched here.
    pub fn refresh_models(&self) {
        self.clear_catalog();
        self.bump_generation();
        tracing::debug!("Catalog cache cleared");
    }

    /// Full single-model detail, always fetched live.
    pub async fn get_model(&self, model_id: u64) -> ClientResult<Model> {
        let (base, key) = self.credentials()?;
        let url = build_model_detail_url(&base, model_id)?;
        let response = self.send(ApiRequest::get(url, key, REQUEST_TIMEOUT)).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }
}
