//! Digest document assembly.
//!
//! The aggregation stage builds one [`Section`] per video plus a leading
//! title section, then hands the lot to a [`DigestRenderer`] for the final
//! document. Markdown is the only binding today; the trait keeps the
//! section-building side ignorant of the output format.

pub mod sections;

pub use sections::{Section, item_section, timestamp_seconds, title_section};

/// Renders an ordered list of sections into one document.
pub trait DigestRenderer {
    fn render(&self, sections: &[Section]) -> String;

    /// Extension for the output file, without the dot.
    fn file_extension(&self) -> &'static str;
}

/// Plain Markdown output.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl DigestRenderer for MarkdownRenderer {
    fn render(&self, sections: &[Section]) -> String {
        let mut out = String::new();
        for section in sections {
            out.push_str(&section.0);
        }
        let trimmed = out.trim_end();
        format!("{trimmed}\n")
    }

    fn file_extension(&self) -> &'static str {
        "md"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
