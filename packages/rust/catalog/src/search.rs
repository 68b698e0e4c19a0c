//! Paged channel search.
//!
//! One call fetches one page of completed-video ids for a channel. The
//! caller follows `next_page_token` until it runs out or has enough ids.

use tracing::{debug, instrument};
use tubedigest_shared::{Result, TubeDigestError, VideoId};

/// Page size requested from the catalog, the maximum the API allows.
pub const PAGE_SIZE: u32 = 50;

/// One page of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub ids: Vec<VideoId>,
    /// Token for the next page, absent on the last one.
    pub next_page_token: Option<String>,
}

/// Client for the catalog search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl SearchClient {
    pub fn new(client: reqwest::Client, api_base: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Fetch one page of completed videos for `channel_id`.
    #[instrument(skip_all, fields(channel_id = %channel_id, paged = page_token.is_some()))]
    pub async fn completed_videos_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let mut request = self
            .client
            .get(format!("{}/search", self.api_base))
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("eventType", "completed"),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .query(&[("maxResults", PAGE_SIZE)]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TubeDigestError::Catalog(format!("search request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TubeDigestError::Catalog(format!(
                "search returned HTTP {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| TubeDigestError::Catalog(format!("search response: {e}")))?;

        let ids: Vec<VideoId> = body
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .map(VideoId::from)
            .collect();
        debug!(count = ids.len(), more = body.next_page_token.is_some(), "search page fetched");

        Ok(SearchPage {
            ids,
            next_page_token: body.next_page_token,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, serde::Deserialize)]
struct SearchItemId {
    /// Absent for non-video results; those are skipped.
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> SearchClient {
        SearchClient::new(build_client(5).unwrap(), &server.uri(), "test-key")
    }

    #[tokio::test]
    async fn fetches_one_page_of_video_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("channelId", "UC123"))
            .and(query_param("eventType", "completed"))
            .and(query_param("type", "video"))
            .and(query_param("key", "test-key"))
            .and(query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": {"videoId": "vid-a"}},
                    {"id": {"videoId": "vid-b"}},
                    {"id": {"kind": "youtube#channel"}}
                ],
                "nextPageToken": "TOKEN2"
            })))
            .mount(&server)
            .await;

        let page = make_client(&server)
            .completed_videos_page("UC123", None)
            .await
            .unwrap();

        assert_eq!(page.ids, vec![VideoId::from("vid-a"), VideoId::from("vid-b")]);
        assert_eq!(page.next_page_token.as_deref(), Some("TOKEN2"));
    }

    #[tokio::test]
    async fn sends_page_token_when_following_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("pageToken", "TOKEN2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": {"videoId": "vid-c"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = make_client(&server)
            .completed_videos_page("UC123", Some("TOKEN2"))
            .await
            .unwrap();

        assert_eq!(page.ids, vec![VideoId::from("vid-c")]);
        assert_eq!(page.next_page_token, None);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .completed_videos_page("UC123", None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("403"));
    }
}
