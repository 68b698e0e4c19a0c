//! File-backed cache for channel listings.
//!
//! Listings are keyed by a digest of every parameter that influences the
//! result set, so re-running a stage with the same parameters reads the
//! cached id list instead of paging through the catalog API again. Changing
//! any parameter produces a new key and therefore a fresh query.

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use tubedigest_shared::{Result, TubeDigestError, VideoId};

/// Derive the cache key for a listing query.
///
/// Both the channel id and the result cap participate; an unset cap hashes
/// differently from any numeric cap so capped and uncapped listings never
/// collide.
pub fn listing_key(channel_id: &str, max_results: Option<u32>) -> String {
    let raw = match max_results {
        Some(cap) => format!("{channel_id}_{cap}"),
        None => format!("{channel_id}_none"),
    };
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cache of listing results stored as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct ListingCache {
    dir: PathBuf,
}

impl ListingCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the cache entry for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("videos_cache_{key}.json"))
    }

    /// Load a cached listing.
    ///
    /// A missing entry is a miss. An unreadable or corrupt entry is logged
    /// and treated as a miss as well, so a damaged file degrades to a live
    /// query instead of aborting the run.
    pub fn load(&self, key: &str) -> Option<Vec<VideoId>> {
        let path = self.entry_path(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache entry unreadable, ignoring");
                return None;
            }
        };

        match serde_json::from_str::<Vec<VideoId>>(&content) {
            Ok(ids) => {
                debug!(path = %path.display(), count = ids.len(), "cache hit");
                Some(ids)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache entry corrupt, ignoring");
                None
            }
        }
    }

    /// Persist a listing under `key`, creating the cache directory if needed.
    pub fn store(&self, key: &str, ids: &[VideoId]) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| TubeDigestError::io(&self.dir, e))?;

        let path = self.entry_path(key);
        let json = serde_json::to_string_pretty(ids)
            .map_err(|e| TubeDigestError::Store(format!("failed to serialize listing: {e}")))?;
        std::fs::write(&path, json).map_err(|e| TubeDigestError::io(&path, e))?;

        debug!(path = %path.display(), count = ids.len(), "listing cached");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tubedigest-cache-test-{}", Uuid::now_v7()))
    }

    fn ids(raw: &[&str]) -> Vec<VideoId> {
        raw.iter().map(|s| VideoId::from(*s)).collect()
    }

    #[test]
    fn key_is_deterministic() {
        let a = listing_key("UC123", Some(10));
        let b = listing_key("UC123", Some(10));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn key_differs_per_parameter() {
        let base = listing_key("UC123", Some(10));
        assert_ne!(base, listing_key("UC999", Some(10)));
        assert_ne!(base, listing_key("UC123", Some(20)));
        assert_ne!(base, listing_key("UC123", None));
    }

    #[test]
    fn store_then_load_roundtrips() {
        let dir = temp_dir();
        let cache = ListingCache::new(&dir);
        let key = listing_key("UC123", None);
        let listing = ids(&["vid-a", "vid-b", "vid-c"]);

        cache.store(&key, &listing).unwrap();
        assert_eq!(cache.load(&key), Some(listing));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_entry_is_a_miss() {
        let cache = ListingCache::new(temp_dir());
        assert_eq!(cache.load("deadbeef"), None);
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = temp_dir();
        let cache = ListingCache::new(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(cache.entry_path("bad"), "not json {{{").unwrap();

        assert_eq!(cache.load("bad"), None);

        std::fs::remove_dir_all(&dir).ok();
    }
}
