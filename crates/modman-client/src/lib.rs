#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod context;
mod error;
mod expand;
mod http;
mod models;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client and bootstrap context
pub use client::{DefaultModmanClient, ModmanClient, ProgressCallback};
pub use context::{BootstrapOptions, ModmanContext};

// Errors
pub use error::{ClientError, ClientResult};

// Transport seam (custom backends, mostly for tests)
pub use http::{
    ApiRequest, ByteStream, HttpBackend, HttpResponse, ReqwestBackend, StreamedResponse,
    UploadPart,
};

// Wire types surfaced by `get_model` and the version expansion
pub use expand::expand_versions;
pub use models::{Model, ModelVersion, ModelsPage};

// Domain types callers pass in and get back
pub use modman_core::{
    CatalogEntry, Category, ConfigStore, FileConfig, GenerationMetadata, LoraUsage, PathError,
};

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
