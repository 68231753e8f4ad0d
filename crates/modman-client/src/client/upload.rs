//! Image upload with stringified generation metadata.

use reqwest::Method;
use serde_json::Value;

use modman_core::GenerationMetadata;

use crate::error::ClientResult;
use crate::http::{ApiRequest, HttpBackend, UploadPart};
use crate::url::build_images_url;

use super::{ModmanClient, UPLOAD_TIMEOUT};

impl<B: HttpBackend> ModmanClient<B> {
    /// Upload a generated image for a model, returning the server's record.
    ///
    /// Requires a validated session; a demoted one fails fast without a
    /// request. Metadata fields are flattened to multipart form strings
    /// (composites JSON-encoded, booleans lowercase, absent values omitted),
    /// and `version_id` rides along as an extra `versionId` field.
    pub async fn upload_image(
        &self,
        model_id: u64,
        image: Vec<u8>,
        file_name: &str,
        metadata: &GenerationMetadata,
        version_id: Option<u64>,
    ) -> ClientResult<Value> {
        let (base, key) = self.validated_credentials()?;

        let mut fields = metadata.to_form_fields();
        if let Some(version_id) = version_id {
            fields.push(("versionId".to_string(), version_id.to_string()));
        }

        let part = UploadPart {
            file_name: file_name.to_string(),
            bytes: image,
            content_type: "image/png".to_string(),
        };

        let request = ApiRequest {
            method: Method::POST,
            url: build_images_url(&base, model_id)?,
            api_key: key,
            timeout: UPLOAD_TIMEOUT,
        };
        let response = self.backend.post_multipart(&request, part, &fields).await?;
        let response = self.classify(response)?;

        tracing::info!(model_id, ?version_id, "Image uploaded");
        Ok(serde_json::from_slice(&response.body)?)
    }
}
