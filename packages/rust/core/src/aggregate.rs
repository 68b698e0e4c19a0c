//! Aggregation stage: bind transformed documents into one digest.
//!
//! Documents are walked in descending filename order so the digest reads
//! newest first. A document without a readable payload contributes nothing
//! and never aborts the build.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument, warn};

use tubedigest_report::{DigestRenderer, Section, item_section, title_section};
use tubedigest_shared::{AppConfig, DigestPayload, Result, SortOrder, TubeDigestError};
use tubedigest_store::{DocumentDir, extract_json_block};

/// Optional front matter for the digest document.
#[derive(Debug, Clone, Default)]
pub struct DigestOptions {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Counters for one digest build.
#[derive(Debug)]
pub struct DigestReport {
    /// Documents that contributed a section.
    pub included: usize,
    /// Documents skipped for a missing or unreadable payload.
    pub skipped: usize,
    /// Where the digest was written.
    pub output_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Build the digest from every transformed document.
///
/// `output_stem` is extended with the renderer's file extension.
#[instrument(skip_all)]
pub fn build_digest(
    config: &AppConfig,
    options: &DigestOptions,
    generated: &DocumentDir,
    renderer: &dyn DigestRenderer,
    output_stem: &Path,
) -> Result<DigestReport> {
    let start = Instant::now();

    let names = generated.list(SortOrder::Descending)?;
    info!(documents = names.len(), "digest build starting");

    let mut sections = vec![title_section(
        options.title.as_deref(),
        options.description.as_deref(),
        &config.inference.model,
    )];

    let mut included = 0;
    let mut skipped = 0;
    for name in &names {
        match section_for(generated, name) {
            Ok(Some(section)) => {
                sections.push(section);
                included += 1;
            }
            Ok(None) => skipped += 1,
            Err(e) => {
                warn!(file = %name, error = %e, "[ERROR] document unreadable, skipping");
                skipped += 1;
            }
        }
    }

    let output_path = PathBuf::from(format!(
        "{}.{}",
        output_stem.display(),
        renderer.file_extension()
    ));
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| TubeDigestError::io(parent, e))?;
        }
    }
    let document = renderer.render(&sections);
    std::fs::write(&output_path, document).map_err(|e| TubeDigestError::io(&output_path, e))?;

    info!(
        included,
        skipped,
        output = %output_path.display(),
        "digest written"
    );
    Ok(DigestReport {
        included,
        skipped,
        output_path,
        elapsed: start.elapsed(),
    })
}

fn section_for(generated: &DocumentDir, name: &str) -> Result<Option<Section>> {
    let contents = generated.read(name)?;

    let Some(block) = extract_json_block(&contents) else {
        warn!(file = %name, "[NO PAYLOAD] no fenced json block, skipping");
        return Ok(None);
    };

    match DigestPayload::parse(block) {
        Ok(payload) => Ok(Some(item_section(name, &payload))),
        Err(e) => {
            warn!(file = %name, error = %e, "[NO PAYLOAD] payload unreadable, skipping");
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
