//! Caption track retrieval and SRT formatting.
//!
//! The timed-text endpoint serves one caption track per language as XML.
//! Languages are tried in the configured order; an empty track means the
//! language has no captions and the next one is tried. Only transport or
//! HTTP failures surface as errors, so "no captions anywhere" stays
//! distinguishable from "the endpoint was down".

use scraper::{Html, Selector};
use tracing::{debug, instrument};
use tubedigest_shared::{CaptionEntry, Result, TubeDigestError, VideoId};

/// Result of a transcript lookup that completed without transport errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    /// SRT-formatted transcript in the first language that had captions.
    Available(String),
    /// None of the requested languages carry captions.
    Unavailable,
}

/// Client for the timed-text caption endpoint.
#[derive(Debug, Clone)]
pub struct TranscriptClient {
    client: reqwest::Client,
    base: String,
}

impl TranscriptClient {
    pub fn new(client: reqwest::Client, base: &str) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the first available caption track, trying `languages` in order.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn fetch(&self, id: &VideoId, languages: &[String]) -> Result<TranscriptOutcome> {
        for lang in languages {
            let response = self
                .client
                .get(&self.base)
                .query(&[("v", id.as_str()), ("lang", lang.as_str())])
                .send()
                .await
                .map_err(|e| TubeDigestError::Catalog(format!("transcript request: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TubeDigestError::Catalog(format!(
                    "transcript endpoint returned HTTP {status}"
                )));
            }

            let body = response
                .text()
                .await
                .map_err(|e| TubeDigestError::Catalog(format!("transcript response: {e}")))?;

            let entries = parse_timedtext(&body);
            if !entries.is_empty() {
                debug!(lang = %lang, entries = entries.len(), "caption track found");
                return Ok(TranscriptOutcome::Available(format_srt(&entries)));
            }
        }

        debug!("no caption track in any requested language");
        Ok(TranscriptOutcome::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Timed-text parsing
// ---------------------------------------------------------------------------

/// Extract caption entries from a timed-text XML document.
///
/// The parser is lenient on purpose; entries without a `start` attribute or
/// without text are dropped rather than failing the track.
pub fn parse_timedtext(xml: &str) -> Vec<CaptionEntry> {
    let doc = Html::parse_document(xml);
    let text_sel = Selector::parse("text").unwrap();

    let mut entries = Vec::new();
    for el in doc.select(&text_sel) {
        let Some(start) = el.value().attr("start").and_then(|v| v.parse::<f64>().ok()) else {
            continue;
        };
        let dur = el
            .value()
            .attr("dur")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);

        let text = el.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        entries.push(CaptionEntry {
            start,
            dur,
            text: text.to_string(),
        });
    }
    entries
}

/// Render caption entries as an SRT document.
pub fn format_srt(entries: &[CaptionEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!("{}\n", i + 1));
        out.push_str(&format!(
            "{} --> {}\n",
            srt_timestamp(entry.start),
            srt_timestamp(entry.end())
        ));
        out.push_str(&entry.text);
        out.push_str("\n\n");
    }
    out
}

fn srt_timestamp(seconds: f64) -> String {
    let total_millis = (seconds * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours:02}:{mins:02}:{secs:02},{millis:03}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_client;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TRACK_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<transcript>
  <text start="1.04" dur="2.5">Good morning everyone</text>
  <text start="3.6" dur="4.0">we begin today&#39;s session</text>
</transcript>"#;

    fn langs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_track_entries() {
        let entries = parse_timedtext(TRACK_XML);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].start, 1.04);
        assert_eq!(entries[0].dur, 2.5);
        assert_eq!(entries[0].text, "Good morning everyone");
        assert_eq!(entries[1].text, "we begin today's session");
    }

    #[test]
    fn empty_track_parses_to_nothing() {
        assert!(parse_timedtext("").is_empty());
        assert!(parse_timedtext("<transcript></transcript>").is_empty());
    }

    #[test]
    fn srt_timestamps_are_zero_padded() {
        assert_eq!(srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(srt_timestamp(1.04), "00:00:01,040");
        assert_eq!(srt_timestamp(3661.5), "01:01:01,500");
    }

    #[test]
    fn srt_entries_are_numbered_from_one() {
        let srt = format_srt(&parse_timedtext(TRACK_XML));
        assert!(srt.starts_with("1\n00:00:01,040 --> 00:00:03,540\nGood morning everyone\n"));
        assert!(srt.contains("\n2\n00:00:03,600 --> 00:00:07,600\n"));
    }

    #[tokio::test]
    async fn falls_back_to_next_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("lang", "pt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("lang", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TRACK_XML))
            .mount(&server)
            .await;

        let client = TranscriptClient::new(build_client(5).unwrap(), &server.uri());
        let outcome = client
            .fetch(&VideoId::from("vid-a"), &langs(&["pt", "en"]))
            .await
            .unwrap();

        match outcome {
            TranscriptOutcome::Available(srt) => assert!(srt.contains("Good morning everyone")),
            other => panic!("expected available transcript, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_captions_anywhere_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let client = TranscriptClient::new(build_client(5).unwrap(), &server.uri());
        let outcome = client
            .fetch(&VideoId::from("vid-a"), &langs(&["pt", "en"]))
            .await
            .unwrap();

        assert_eq!(outcome, TranscriptOutcome::Unavailable);
    }

    #[tokio::test]
    async fn server_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = TranscriptClient::new(build_client(5).unwrap(), &server.uri());
        let err = client
            .fetch(&VideoId::from("vid-a"), &langs(&["pt"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("500"));
    }
}
