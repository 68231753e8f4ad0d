#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod catalog;
pub mod category;
pub mod config;
pub mod metadata;
pub mod paths;

#[cfg(test)]
pub(crate) mod test_utils;

// ============================================================================
// Re-exports
// ============================================================================

pub use catalog::CatalogEntry;
pub use category::{Category, UnknownCategory};
pub use config::{CONFIG_FILE_NAME, ConfigStore, FileConfig};
pub use metadata::{GenerationMetadata, LoraUsage, merge_lora_usage};
pub use paths::{
    CacheDirResolution, CacheDirSource, PathError, data_root, ensure_directory, resolve_cache_dir,
};
