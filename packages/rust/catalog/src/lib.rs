//! Typed clients for the upstream video catalog.
//!
//! Three narrow clients, one per endpoint family: paged channel search,
//! per-video metadata, and caption tracks. Each call maps to a single HTTP
//! request; paging and sweep logic live with the pipeline stages, which
//! keeps these clients trivial to exercise against a mock server.

use std::time::Duration;

use tubedigest_shared::{Result, TubeDigestError};

pub mod metadata;
pub mod search;
pub mod transcript;

pub use metadata::MetadataClient;
pub use search::{PAGE_SIZE, SearchClient, SearchPage};
pub use transcript::{TranscriptClient, TranscriptOutcome};

/// Build the HTTP client shared by the catalog endpoints.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("tubedigest/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TubeDigestError::Catalog(format!("failed to build HTTP client: {e}")))
}
