//! Markdown document storage and format helpers.
//!
//! Transcripts and generated analyses are stored as Markdown files, one per
//! video, in flat directories. [`DocumentDir`] covers the directory
//! operations every stage needs; the free functions render and pick apart
//! the two document formats.

use std::io::Write;
use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use tracing::debug;
use tubedigest_shared::{Result, SortOrder, TubeDigestError};

/// Label line announcing the publish date in a raw transcript document.
///
/// The renderer and the date scanner both go through this constant so they
/// can never drift apart.
pub const PUBLISH_DATE_LABEL: &str = "**Publish Date:**";

// ---------------------------------------------------------------------------
// Directory operations
// ---------------------------------------------------------------------------

/// A flat directory of Markdown documents, addressed by file name.
#[derive(Debug, Clone)]
pub struct DocumentDir {
    dir: PathBuf,
}

impl DocumentDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.dir
    }

    /// Absolute path of a document by file name.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| TubeDigestError::io(&self.dir, e))
    }

    /// Whether a document with this file name already exists.
    pub fn contains(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// List `.md` file names, sorted by name in the requested order.
    ///
    /// A missing directory yields an empty list so stages can report zero
    /// work instead of failing.
    pub fn list(&self, order: SortOrder) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "document directory missing, nothing to list");
                return Ok(Vec::new());
            }
            Err(e) => return Err(TubeDigestError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TubeDigestError::io(&self.dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        if order == SortOrder::Descending {
            names.reverse();
        }
        Ok(names)
    }

    /// Read a document's full contents.
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.path_of(name);
        std::fs::read_to_string(&path).map_err(|e| TubeDigestError::io(&path, e))
    }

    /// Write a new document, refusing to overwrite an existing one.
    ///
    /// Existing documents are treated as completed work; callers check
    /// [`contains`](Self::contains) first and skip, so hitting an existing
    /// file here is an error rather than a silent replace.
    pub fn write_new(&self, name: &str, contents: &str) -> Result<PathBuf> {
        self.ensure()?;
        let path = self.path_of(name);
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| TubeDigestError::io(&path, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| TubeDigestError::io(&path, e))?;
        Ok(path)
    }

    /// Rename a document within the directory.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let src = self.path_of(from);
        let dst = self.path_of(to);
        std::fs::rename(&src, &dst).map_err(|e| TubeDigestError::io(&src, e))
    }
}

// ---------------------------------------------------------------------------
// Raw transcript documents
// ---------------------------------------------------------------------------

/// A raw transcript document before rendering to Markdown.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub link: String,
    pub transcript: String,
}

impl RawDocument {
    /// Render the document: title heading, metadata labels, and the
    /// transcript inside an `srt` code fence.
    pub fn render(&self) -> String {
        let mut transcript = self.transcript.clone();
        if !transcript.ends_with('\n') {
            transcript.push('\n');
        }
        format!(
            "# {title}\n\n{label} {date}\n**Link:** {link}\n\n```srt\n{transcript}```\n",
            title = self.title,
            label = PUBLISH_DATE_LABEL,
            date = self.publish_date.format("%Y-%m-%d %H:%M:%S"),
            link = self.link,
        )
    }
}

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("valid regex"));

/// Scan a raw document for its publish date.
///
/// Looks for the first [`PUBLISH_DATE_LABEL`] line and extracts the leading
/// `YYYY-MM-DD` portion of its value. Returns `None` when the label or a
/// parseable date is absent.
pub fn parse_publish_date(contents: &str) -> Option<NaiveDate> {
    for line in contents.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(PUBLISH_DATE_LABEL) {
            let found = DATE_RE.find(rest)?;
            return NaiveDate::parse_from_str(found.as_str(), "%Y-%m-%d").ok();
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Transformed documents
// ---------------------------------------------------------------------------

/// Render a transformed document: provenance header followed by the model
/// response.
///
/// Token figures arrive pre-formatted so approximate counts keep their
/// `(approximate)` marker.
pub fn render_transformed(
    source_name: &str,
    model: &str,
    provider: &str,
    input_tokens: &str,
    output_tokens: &str,
    response: &str,
) -> String {
    let mut response = response.to_string();
    if !response.ends_with('\n') {
        response.push('\n');
    }
    format!(
        "# Analysis of {source_name}\n\n\
         - Model: {model}\n\
         - Provider: {provider}\n\
         - Input tokens: {input_tokens}\n\
         - Output tokens: {output_tokens}\n\n\
         {response}"
    )
}

/// Extract the contents of the first fenced ```` ```json ```` block.
///
/// Returns the trimmed text between the fences, or `None` when either fence
/// is missing.
pub fn extract_json_block(contents: &str) -> Option<&str> {
    let start = contents.find("```json")?;
    let after = &contents[start + "```json".len()..];
    let end = after.find("```")?;
    Some(after[..end].trim())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn temp_dir() -> DocumentDir {
        DocumentDir::new(
            std::env::temp_dir().join(format!("tubedigest-docs-test-{}", Uuid::now_v7())),
        )
    }

    fn make_raw() -> RawDocument {
        RawDocument {
            title: "Council Session 12".to_string(),
            publish_date: Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap(),
            link: "https://www.youtube.com/watch?v=abc123".to_string(),
            transcript: "1\n00:00:01,000 --> 00:00:04,000\nGood morning everyone".to_string(),
        }
    }

    #[test]
    fn raw_document_renders_header_and_fence() {
        let doc = make_raw().render();
        assert!(doc.starts_with("# Council Session 12\n"));
        assert!(doc.contains("**Publish Date:** 2025-03-14 15:09:26\n"));
        assert!(doc.contains("**Link:** https://www.youtube.com/watch?v=abc123\n"));
        assert!(doc.contains("```srt\n1\n00:00:01,000"));
        assert!(doc.ends_with("```\n"));
    }

    #[test]
    fn publish_date_roundtrips_through_render() {
        let doc = make_raw().render();
        assert_eq!(
            parse_publish_date(&doc),
            Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
        );
    }

    #[test]
    fn publish_date_absent_when_label_missing() {
        assert_eq!(parse_publish_date("# Title\n\nNo metadata here\n"), None);
    }

    #[test]
    fn publish_date_absent_when_value_unparseable() {
        let doc = "# Title\n\n**Publish Date:** soon\n";
        assert_eq!(parse_publish_date(doc), None);
    }

    #[test]
    fn transformed_document_carries_provenance() {
        let doc = render_transformed(
            "video.md",
            "meta-llama/Llama-3.3-70B-Instruct",
            "cerebras",
            "1523",
            "412 (approximate)",
            "The session covered budget items.",
        );
        assert!(doc.starts_with("# Analysis of video.md\n"));
        assert!(doc.contains("- Model: meta-llama/Llama-3.3-70B-Instruct\n"));
        assert!(doc.contains("- Provider: cerebras\n"));
        assert!(doc.contains("- Input tokens: 1523\n"));
        assert!(doc.contains("- Output tokens: 412 (approximate)\n"));
        assert!(doc.ends_with("The session covered budget items.\n"));
    }

    #[test]
    fn extract_json_block_finds_payload() {
        let doc = "# Analysis\n\nPreamble\n\n```json\n{\"link\": \"x\"}\n```\n\nTrailer\n";
        assert_eq!(extract_json_block(doc), Some("{\"link\": \"x\"}"));
    }

    #[test]
    fn extract_json_block_requires_both_fences() {
        assert_eq!(extract_json_block("no fences at all"), None);
        assert_eq!(extract_json_block("```json\n{\"unterminated\": true}"), None);
    }

    #[test]
    fn extract_json_block_handles_empty_block() {
        assert_eq!(extract_json_block("```json\n```"), Some(""));
    }

    #[test]
    fn list_sorts_by_name() {
        let docs = temp_dir();
        docs.ensure().unwrap();
        docs.write_new("20250310-b.md", "b").unwrap();
        docs.write_new("20250512-a.md", "a").unwrap();
        docs.write_new("20250101-c.md", "c").unwrap();
        std::fs::write(docs.path_of("notes.txt"), "ignored").unwrap();

        assert_eq!(
            docs.list(SortOrder::Descending).unwrap(),
            vec!["20250512-a.md", "20250310-b.md", "20250101-c.md"]
        );
        assert_eq!(
            docs.list(SortOrder::Ascending).unwrap(),
            vec!["20250101-c.md", "20250310-b.md", "20250512-a.md"]
        );

        std::fs::remove_dir_all(docs.path()).ok();
    }

    #[test]
    fn list_of_missing_directory_is_empty() {
        let docs = temp_dir();
        assert_eq!(docs.list(SortOrder::Descending).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn write_new_refuses_to_overwrite() {
        let docs = temp_dir();
        docs.write_new("doc.md", "first").unwrap();
        assert!(docs.write_new("doc.md", "second").is_err());
        assert_eq!(docs.read("doc.md").unwrap(), "first");

        std::fs::remove_dir_all(docs.path()).ok();
    }

    #[test]
    fn rename_moves_document() {
        let docs = temp_dir();
        docs.write_new("old.md", "contents").unwrap();
        docs.rename("old.md", "20250314-old.md").unwrap();
        assert!(!docs.contains("old.md"));
        assert_eq!(docs.read("20250314-old.md").unwrap(), "contents");

        std::fs::remove_dir_all(docs.path()).ok();
    }
}
