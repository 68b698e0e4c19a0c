//! Fetch stage: per-item metadata, retention filter, transcript download.
//!
//! The sweep is best-effort. Policy skips and per-item failures are
//! logged and counted, never fatal; retries happen by re-running the
//! stage, which skips everything already on disk.

use std::time::Instant;

use chrono::Datelike;
use tracing::{info, instrument, warn};

use tubedigest_catalog::{MetadataClient, TranscriptClient, TranscriptOutcome};
use tubedigest_shared::{AppConfig, Result, VideoId};
use tubedigest_store::{DocumentDir, FailureList, RawDocument};

use crate::naming::slug;
use crate::progress::ProgressReporter;

/// The two catalog clients the fetch stage needs.
pub struct FetchClients {
    pub metadata: MetadataClient,
    pub transcript: TranscriptClient,
}

/// Counters for one fetch run.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Raw documents written.
    pub downloaded: usize,
    /// Items outside the target year.
    pub skipped_old: usize,
    /// Items whose raw document already existed.
    pub skipped_duplicate: usize,
    /// Items with no captions in any requested language.
    pub unavailable: usize,
    /// Items that failed with an upstream error; also on the failures list.
    pub failed: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

enum FetchOutcome {
    Downloaded,
    SkippedOld,
    SkippedDuplicate,
    Unavailable,
}

/// Fetch transcripts for every discovered item.
#[instrument(skip_all, fields(items = ids.len()))]
pub async fn fetch_all(
    config: &AppConfig,
    ids: &[VideoId],
    clients: &FetchClients,
    raw_docs: &DocumentDir,
    failures: &FailureList,
    progress: &dyn ProgressReporter,
) -> Result<FetchReport> {
    let start = Instant::now();
    progress.phase("fetch");

    let mut report = FetchReport::default();
    for (i, id) in ids.iter().enumerate() {
        progress.item_processed(id.as_str(), i + 1, ids.len());

        match fetch_one(config, id, clients, raw_docs).await {
            Ok(FetchOutcome::Downloaded) => report.downloaded += 1,
            Ok(FetchOutcome::SkippedOld) => report.skipped_old += 1,
            Ok(FetchOutcome::SkippedDuplicate) => report.skipped_duplicate += 1,
            Ok(FetchOutcome::Unavailable) => report.unavailable += 1,
            Err(e) => {
                warn!(id = %id, error = %e, "[ERROR] item fetch failed");
                failures.append(id)?;
                report.failed += 1;
            }
        }
    }

    report.elapsed = start.elapsed();
    info!(
        downloaded = report.downloaded,
        skipped_old = report.skipped_old,
        skipped_duplicate = report.skipped_duplicate,
        unavailable = report.unavailable,
        failed = report.failed,
        "fetch finished"
    );
    Ok(report)
}

async fn fetch_one(
    config: &AppConfig,
    id: &VideoId,
    clients: &FetchClients,
    raw_docs: &DocumentDir,
) -> Result<FetchOutcome> {
    let meta = clients.metadata.fetch(id).await?;

    let year = meta.publish_date.year();
    if year != config.defaults.target_year {
        info!(id = %id, year, "[OLD] outside target year, skipping");
        return Ok(FetchOutcome::SkippedOld);
    }

    let stem = slug(&meta.title);
    let name = if stem.is_empty() {
        format!("{id}.md")
    } else {
        format!("{stem}.md")
    };
    if raw_docs.contains(&name) {
        info!(id = %id, file = %name, "[DUPLICATE] already downloaded, skipping");
        return Ok(FetchOutcome::SkippedDuplicate);
    }

    match clients
        .transcript
        .fetch(id, &config.defaults.languages)
        .await?
    {
        TranscriptOutcome::Available(srt) => {
            let doc = RawDocument {
                title: meta.title,
                publish_date: meta.publish_date,
                link: id.watch_url(),
                transcript: srt,
            };
            raw_docs.write_new(&name, &doc.render())?;
            info!(id = %id, file = %name, "[OK] transcript saved");
            Ok(FetchOutcome::Downloaded)
        }
        TranscriptOutcome::Unavailable => {
            warn!(id = %id, "[UNAVAILABLE] no captions in any requested language");
            Ok(FetchOutcome::Unavailable)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use serde_json::json;
    use std::path::PathBuf;
    use tubedigest_catalog::build_client;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TRACK_XML: &str = r#"<transcript>
  <text start="1.0" dur="2.0">Good morning everyone</text>
  <text start="3.0" dur="2.5">the session is open</text>
</transcript>"#;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("tubedigest-fetch-test-{}", Uuid::now_v7()))
    }

    fn make_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.defaults.channel_id = "UC123".to_string();
        config.defaults.target_year = 2025;
        config
    }

    fn make_clients(server: &MockServer) -> FetchClients {
        FetchClients {
            metadata: MetadataClient::new(build_client(5).unwrap(), &server.uri(), "test-key"),
            transcript: TranscriptClient::new(
                build_client(5).unwrap(),
                &format!("{}/timedtext", server.uri()),
            ),
        }
    }

    async fn mount_metadata(server: &MockServer, id: &str, title: &str, published: &str) {
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"snippet": {
                    "title": title,
                    "publishedAt": published,
                    "description": ""
                }}]
            })))
            .mount(server)
            .await;
    }

    async fn run(
        config: &AppConfig,
        ids: &[VideoId],
        server: &MockServer,
        root: &PathBuf,
    ) -> (FetchReport, DocumentDir, FailureList) {
        let raw_docs = DocumentDir::new(root.join("transcriptions"));
        let failures = FailureList::new(root.join("cache").join("failed_items.txt"));
        let report = fetch_all(
            config,
            ids,
            &make_clients(server),
            &raw_docs,
            &failures,
            &SilentProgress,
        )
        .await
        .unwrap();
        (report, raw_docs, failures)
    }

    #[tokio::test]
    async fn downloads_and_then_skips_as_duplicate() {
        let server = MockServer::start().await;
        mount_metadata(&server, "vid-a", "Council Session 12", "2025-03-14T15:09:26Z").await;
        Mock::given(method("GET"))
            .and(path("/timedtext"))
            .and(query_param("v", "vid-a"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TRACK_XML))
            .mount(&server)
            .await;

        let root = temp_root();
        let config = make_config();
        let ids = vec![VideoId::from("vid-a")];

        let (first, raw_docs, _) = run(&config, &ids, &server, &root).await;
        assert_eq!(first.downloaded, 1);
        assert!(raw_docs.contains("council-session-12.md"));

        let (second, _, failures) = run(&config, &ids, &server, &root).await;
        assert_eq!(second.downloaded, 0);
        assert_eq!(second.skipped_duplicate, 1);
        assert!(failures.load().unwrap().is_empty());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn wrong_year_never_writes_a_document() {
        let server = MockServer::start().await;
        mount_metadata(&server, "vid-old", "Old Session", "2024-06-01T10:00:00Z").await;
        Mock::given(method("GET"))
            .and(path("/timedtext"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TRACK_XML))
            .expect(0)
            .mount(&server)
            .await;

        let root = temp_root();
        let (report, raw_docs, _) =
            run(&make_config(), &[VideoId::from("vid-old")], &server, &root).await;

        assert_eq!(report.skipped_old, 1);
        assert_eq!(report.downloaded, 0);
        assert!(raw_docs.list(Default::default()).unwrap().is_empty());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn missing_captions_leave_no_trace_but_a_log() {
        let server = MockServer::start().await;
        mount_metadata(&server, "vid-mute", "Silent Session", "2025-01-02T08:00:00Z").await;
        Mock::given(method("GET"))
            .and(path("/timedtext"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let root = temp_root();
        let (report, raw_docs, failures) =
            run(&make_config(), &[VideoId::from("vid-mute")], &server, &root).await;

        assert_eq!(report.unavailable, 1);
        assert!(raw_docs.list(Default::default()).unwrap().is_empty());
        assert!(failures.load().unwrap().is_empty());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn upstream_error_is_recorded_and_sweep_continues() {
        let server = MockServer::start().await;
        mount_metadata(&server, "vid-bad", "Broken Session", "2025-02-01T09:00:00Z").await;
        mount_metadata(&server, "vid-good", "Working Session", "2025-02-02T09:00:00Z").await;
        Mock::given(method("GET"))
            .and(path("/timedtext"))
            .and(query_param("v", "vid-bad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/timedtext"))
            .and(query_param("v", "vid-good"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TRACK_XML))
            .mount(&server)
            .await;

        let root = temp_root();
        let ids = vec![VideoId::from("vid-bad"), VideoId::from("vid-good")];
        let (report, raw_docs, failures) = run(&make_config(), &ids, &server, &root).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.downloaded, 1);
        assert!(raw_docs.contains("working-session.md"));
        assert_eq!(failures.load().unwrap(), vec![VideoId::from("vid-bad")]);

        std::fs::remove_dir_all(&root).ok();
    }
}
