//! Shared types, error model, and configuration for tubedigest.
//!
//! This crate is the foundation depended on by all other tubedigest crates.
//! It provides:
//! - [`TubeDigestError`] — the unified error type
//! - Domain types ([`VideoId`], [`ItemMetadata`], [`CaptionEntry`], [`DigestPayload`])
//! - Configuration ([`AppConfig`], config loading, API-key resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, DefaultsConfig, InferenceConfig, StorageConfig, catalog_api_key,
    config_dir, config_file_path, inference_api_key, init_config, load_config, load_config_from,
};
pub use error::{Result, TubeDigestError};
pub use types::{
    CURRENT_PAYLOAD_VERSION, CaptionEntry, DigestPayload, ItemMetadata, SortOrder, SpeechNote,
    VideoId,
};
