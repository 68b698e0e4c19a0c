//! Per-video metadata lookups.

use chrono::{DateTime, Utc};
use tracing::instrument;
use tubedigest_shared::{ItemMetadata, Result, TubeDigestError, VideoId};

/// Client for the catalog videos endpoint.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl MetadataClient {
    pub fn new(client: reqwest::Client, api_base: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Fetch title, publish date, and description for one video.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn fetch(&self, id: &VideoId) -> Result<ItemMetadata> {
        let response = self
            .client
            .get(format!("{}/videos", self.api_base))
            .query(&[
                ("part", "snippet"),
                ("id", id.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TubeDigestError::Catalog(format!("metadata request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TubeDigestError::Catalog(format!(
                "metadata returned HTTP {status}"
            )));
        }

        let body: VideosResponse = response
            .json()
            .await
            .map_err(|e| TubeDigestError::Catalog(format!("metadata response: {e}")))?;

        let item = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| TubeDigestError::Catalog(format!("video {id} not found in catalog")))?;

        Ok(ItemMetadata {
            title: item.snippet.title,
            publish_date: item.snippet.published_at,
            description: item.snippet.description,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, serde::Deserialize)]
struct VideoItem {
    snippet: Snippet,
}

#[derive(Debug, serde::Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "publishedAt")]
    published_at: DateTime<Utc>,
    #[serde(default)]
    description: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
