//! URL construction for the Model Manager API.

use modman_core::Category;
use url::Url;

use crate::error::ClientResult;

/// Listing page size; the service caps pages at 100 items.
pub const PAGE_LIMIT: u32 = 100;

/// Listing URL for one page of a category.
pub fn build_models_page_url(base: &str, category: Category, page: u32) -> ClientResult<Url> {
    Ok(Url::parse(&format!(
        "{base}/api/v1/models?category={}&include=versions&limit={PAGE_LIMIT}&page={page}",
        urlencoding::encode(category.remote_name()),
    ))?)
}

/// Bounded probe URL used to validate credentials.
pub fn build_probe_url(base: &str) -> ClientResult<Url> {
    Ok(Url::parse(&format!("{base}/api/v1/models?limit=1"))?)
}

/// Single-model detail URL.
pub fn build_model_detail_url(base: &str, model_id: u64) -> ClientResult<Url> {
    Ok(Url::parse(&format!("{base}/api/v1/models/{model_id}"))?)
}

/// Binary download URL, with the optional version selector.
pub fn build_download_url(base: &str, model_id: u64, version_id: Option<u64>) -> ClientResult<Url> {
    let mut url = Url::parse(&format!("{base}/api/v1/models/{model_id}/download"))?;
    if let Some(version_id) = version_id {
        url.set_query(Some(&format!("versionId={version_id}")));
    }
    Ok(url)
}

/// Image upload URL.
pub fn build_images_url(base: &str, model_id: u64) -> ClientResult<Url> {
    Ok(Url::parse(&format!("{base}/api/v1/models/{model_id}/images"))?)
}
