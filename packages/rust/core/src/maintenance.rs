//! One-shot maintenance over the raw document directory.
//!
//! Neither operation belongs to the steady-state pipeline. The date rename
//! retrofits sortable `YYYYMMDD-` prefixes onto documents written before
//! the prefix existed; concat joins everything into a single file for
//! manual review or bulk prompting.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use tubedigest_shared::{Result, SortOrder, TubeDigestError};
use tubedigest_store::{DocumentDir, parse_publish_date};

use crate::naming::{dated_name, has_date_prefix};

/// Counters for one rename sweep.
#[derive(Debug, Default)]
pub struct RenameReport {
    /// Documents renamed.
    pub renamed: usize,
    /// Documents already carrying their date prefix.
    pub already_prefixed: usize,
    /// Documents without a readable publish date line.
    pub skipped_no_date: usize,
    /// Documents whose target name already exists.
    pub skipped_collision: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Rename every raw document to carry its publish date as a `YYYYMMDD-`
/// prefix.
///
/// Re-running is safe: already-prefixed documents are left alone, and a
/// rename never overwrites an existing file.
#[instrument(skip_all)]
pub fn rename_with_date(raw_docs: &DocumentDir) -> Result<RenameReport> {
    let start = Instant::now();

    let mut report = RenameReport::default();
    for name in raw_docs.list(SortOrder::Ascending)? {
        let contents = match raw_docs.read(&name) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(file = %name, error = %e, "[ERROR] unreadable, skipping");
                report.skipped_no_date += 1;
                continue;
            }
        };

        let Some(date) = parse_publish_date(&contents) else {
            warn!(file = %name, "[NO DATE] publish date line missing, skipping");
            report.skipped_no_date += 1;
            continue;
        };

        if has_date_prefix(&name, date) {
            debug!(file = %name, "already prefixed");
            report.already_prefixed += 1;
            continue;
        }

        let target = dated_name(&name, date);
        if raw_docs.contains(&target) {
            warn!(file = %name, target = %target, "[COLLISION] target exists, skipping");
            report.skipped_collision += 1;
            continue;
        }

        raw_docs.rename(&name, &target)?;
        info!(from = %name, to = %target, "[RENAMED]");
        report.renamed += 1;
    }

    report.elapsed = start.elapsed();
    info!(
        renamed = report.renamed,
        already_prefixed = report.already_prefixed,
        skipped_no_date = report.skipped_no_date,
        skipped_collision = report.skipped_collision,
        "rename sweep finished"
    );
    Ok(report)
}

/// Counters for one concatenation run.
#[derive(Debug)]
pub struct ConcatReport {
    /// Documents joined.
    pub files: usize,
    /// Where the joined file was written.
    pub output_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Join all raw documents into one Markdown file with rule separators.
#[instrument(skip_all)]
pub fn concat(raw_docs: &DocumentDir, output: &Path, order: SortOrder) -> Result<ConcatReport> {
    let start = Instant::now();

    let names = raw_docs.list(order)?;
    let mut parts = Vec::with_capacity(names.len());
    for name in &names {
        let mut text = raw_docs.read(name)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        parts.push(text);
    }

    let joined = parts.join("\n---\n\n");
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| TubeDigestError::io(parent, e))?;
        }
    }
    std::fs::write(output, joined).map_err(|e| TubeDigestError::io(output, e))?;

    info!(files = names.len(), output = %output.display(), "documents concatenated");
    Ok(ConcatReport {
        files: names.len(),
        output_path: output.to_path_buf(),
        elapsed: start.elapsed(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
