//! HTTP backend abstraction for the Model Manager API.
//!
//! The client builds full requests (URL, bearer key, per-operation timeout)
//! and hands them to an [`HttpBackend`]. The production backend wraps
//! reqwest; tests drive the client through a canned-response fake without
//! opening sockets. Status classification stays in the client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::Method;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Stream of response body chunks.
pub type ByteStream = BoxStream<'static, ClientResult<Bytes>>;

/// One fully built API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Request URL, query included.
    pub url: Url,
    /// Bearer key sent in the Authorization header.
    pub api_key: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl ApiRequest {
    /// A GET request with the given timeout.
    pub fn get(url: Url, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::GET,
            url,
            api_key: api_key.into(),
            timeout,
        }
    }
}

/// Buffered response: status plus the full body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Streaming response: headers up front, body as a chunk stream.
pub struct StreamedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Content-Length header value, when the server sent one.
    pub content_length: Option<u64>,
    /// Content-Disposition header value, when the server sent one.
    pub content_disposition: Option<String>,
    /// Body chunks.
    pub stream: ByteStream,
}

impl StreamedResponse {
    /// Whether the status is in the 2xx range.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// File part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// File name reported to the service.
    pub file_name: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// MIME type of the file part.
    pub content_type: String,
}

/// Transport seam for the Model Manager API.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Execute a request and buffer the whole body.
    async fn request(&self, request: &ApiRequest) -> ClientResult<HttpResponse>;

    /// Execute a request, returning the body as a stream.
    async fn request_stream(&self, request: &ApiRequest) -> ClientResult<StreamedResponse>;

    /// Execute a multipart POST: one `file` part plus string fields.
    async fn post_multipart(
        &self,
        request: &ApiRequest,
        file: UploadPart,
        fields: &[(String, String)],
    ) -> ClientResult<HttpResponse>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend over a shared reqwest client.
///
/// Timeouts are per request (downloads run far longer than probes), so the
/// underlying client carries no global timeout.
#[derive(Debug, Clone, Default)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a new backend.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn build(&self, request: &ApiRequest) -> reqwest::RequestBuilder {
        self.client
            .request(request.method.clone(), request.url.clone())
            .bearer_auth(&request.api_key)
            .timeout(request.timeout)
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn request(&self, request: &ApiRequest) -> ClientResult<HttpResponse> {
        let response = self.build(request).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse { status, body })
    }

    async fn request_stream(&self, request: &ApiRequest) -> ClientResult<StreamedResponse> {
        let response = self.build(request).send().await?;
        let status = response.status().as_u16();
        let content_length = response.content_length();
        let content_disposition = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ClientError::from))
            .boxed();

        Ok(StreamedResponse {
            status,
            content_length,
            content_disposition,
            stream,
        })
    }

    async fn post_multipart(
        &self,
        request: &ApiRequest,
        file: UploadPart,
        fields: &[(String, String)],
    ) -> ClientResult<HttpResponse> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;

        let mut form = reqwest::multipart::Form::new().part("file", part);
        for (key, value) in fields {
            form = form.text(key.clone(), value.clone());
        }

        let response = self.build(request).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse { status, body })
    }
}

// ============================================================================
// Test Backend
// ============================================================================


#[cfg(test)]
mod tests {
    use super::testing::{CannedResponse, CannedStream, FakeBackend};
    use super::*;
    use serde_json::json;

    fn get(url: &str) -> ApiRequest {
        ApiRequest::get(Url::parse(url).unwrap(), "test-key", Duration::from_secs(5))
    }

    #[test]
    fn success_covers_the_2xx_range() {
        let response = |status| HttpResponse {
            status,
            body: Bytes::new(),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(301).is_success());
        assert!(!response(401).is_success());
        assert!(!response(500).is_success());
    }

    #[test]
    fn reqwest_backend_is_constructible() {
        let _backend = ReqwestBackend::new();
    }

    #[tokio::test]
    async fn fake_backend_matches_by_url_substring() {
        let backend = FakeBackend::new()
            .with_response("?limit=1", CannedResponse::ok(json!({"items": []})));

        let response = backend
            .request(&get("https://example.com/api/v1/models?limit=1"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(backend.request_count(), 1);
        assert_eq!(backend.seen()[0].api_key, "test-key");
    }

    #[tokio::test]
    async fn fake_backend_rejects_unmatched_urls() {
        let backend = FakeBackend::new();
        let result = backend.request(&get("https://example.com/unknown")).await;
        assert!(matches!(result, Err(ClientError::Network { .. })));
    }

    #[tokio::test]
    async fn fake_backend_streams_canned_chunks() {
        let backend = FakeBackend::new().with_stream(
            "/download",
            CannedStream {
                status: 200,
                content_length: Some(4),
                content_disposition: None,
                chunks: vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))],
            },
        );

        let mut response = backend
            .request_stream(&get("https://example.com/api/v1/models/1/download"))
            .await
            .unwrap();

        let mut collected = Vec::new();
        while let Some(chunk) = response.stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"abcd");
    }
}
