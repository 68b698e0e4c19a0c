//! Discovery stage: list the channel's completed videos.
//!
//! The listing is cached by query parameters; a cache hit answers without
//! touching the network at all. Paging failures are fatal to the run, since
//! a partial listing would silently shrink every later stage.

use tracing::{info, instrument};

use tubedigest_catalog::SearchClient;
use tubedigest_shared::{AppConfig, Result, TubeDigestError, VideoId};
use tubedigest_store::{ListingCache, listing_key};

/// Outcome of a discovery run.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// Discovered video ids, newest first as the catalog returns them.
    pub ids: Vec<VideoId>,
    /// Whether the listing came from cache instead of the network.
    pub from_cache: bool,
}

/// List completed videos for the configured channel.
///
/// On a cache miss, pages through the catalog following continuation
/// tokens. `max_results` caps accumulation mid-page without overshooting;
/// the capped (or complete) listing is persisted before returning.
#[instrument(skip_all, fields(channel_id = %config.defaults.channel_id))]
pub async fn list_items(
    config: &AppConfig,
    client: &SearchClient,
    cache: &ListingCache,
    max_results: Option<u32>,
) -> Result<DiscoveryResult> {
    let channel_id = &config.defaults.channel_id;
    if channel_id.is_empty() {
        return Err(TubeDigestError::config("defaults.channel_id is not set"));
    }

    let key = listing_key(channel_id, max_results);
    if let Some(ids) = cache.load(&key) {
        info!(count = ids.len(), "listing served from cache");
        return Ok(DiscoveryResult {
            ids,
            from_cache: true,
        });
    }

    let mut ids: Vec<VideoId> = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = client
            .completed_videos_page(channel_id, page_token.as_deref())
            .await?;

        for id in page.ids {
            ids.push(id);
            if let Some(cap) = max_results {
                if ids.len() as u32 >= cap {
                    cache.store(&key, &ids)?;
                    info!(count = ids.len(), capped = true, "listing fetched");
                    return Ok(DiscoveryResult {
                        ids,
                        from_cache: false,
                    });
                }
            }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    cache.store(&key, &ids)?;
    info!(count = ids.len(), "listing fetched");
    Ok(DiscoveryResult {
        ids,
        from_cache: false,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
