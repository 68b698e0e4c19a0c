//! Core domain types for the tubedigest pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TubeDigestError};

/// Current schema version for the structured payload embedded in
/// transformed documents.
pub const CURRENT_PAYLOAD_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// VideoId
// ---------------------------------------------------------------------------

/// Opaque catalog identifier for one video, assigned upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// ItemMetadata
// ---------------------------------------------------------------------------

/// Per-video metadata, fetched once and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Video title as published.
    pub title: String,
    /// Publication timestamp.
    pub publish_date: DateTime<Utc>,
    /// Channel-provided description.
    pub description: String,
}

// ---------------------------------------------------------------------------
// CaptionEntry
// ---------------------------------------------------------------------------

/// One timed caption line from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    /// Start offset in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub dur: f64,
    /// Caption text.
    pub text: String,
}

impl CaptionEntry {
    /// End offset in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.dur
    }
}

// ---------------------------------------------------------------------------
// DigestPayload
// ---------------------------------------------------------------------------

/// The structured payload a transformed document embeds in a fenced
/// JSON block. The inference prompt defines this shape; aggregation
/// parses and validates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestPayload {
    /// Payload schema version; absent means version 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    /// Source video link.
    pub link: String,
    /// Digest title for the video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Whole-video analysis text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    /// Timestamped excerpts worth deep-linking.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_speeches: Vec<SpeechNote>,
}

/// One timestamped excerpt inside a [`DigestPayload`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechNote {
    /// `HH:MM:SS`-prefixed timestamp into the video.
    pub timestamp: String,
    /// Analysis of this excerpt.
    pub analysis: String,
}

impl DigestPayload {
    /// Parse and validate a payload from the JSON text of a fenced block.
    pub fn parse(json: &str) -> Result<Self> {
        let payload: Self = serde_json::from_str(json)
            .map_err(|e| TubeDigestError::parse(format!("invalid payload JSON: {e}")))?;

        if let Some(version) = payload.schema_version {
            if version > CURRENT_PAYLOAD_VERSION {
                return Err(TubeDigestError::validation(format!(
                    "unsupported payload schema_version: {version} (max {CURRENT_PAYLOAD_VERSION})"
                )));
            }
        }

        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// SortOrder
// ---------------------------------------------------------------------------

/// Filename sort direction for document sweeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first when filenames carry a date prefix.
    #[default]
    Descending,
    /// Oldest first.
    Ascending,
}
