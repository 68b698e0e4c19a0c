//! Filesystem persistence for listings, documents, and failure records.
//!
//! Everything the pipeline produces lives in plain files under the storage
//! root: cached listings as JSON, transcripts and generated analyses as
//! Markdown, failed item ids as a line-oriented text file. The layout is
//! deliberately transparent so users can inspect or edit artifacts with
//! ordinary tools.

pub mod cache;
pub mod documents;
pub mod failures;

pub use cache::{ListingCache, listing_key};
pub use documents::{
    DocumentDir, PUBLISH_DATE_LABEL, RawDocument, extract_json_block, parse_publish_date,
    render_transformed,
};
pub use failures::FailureList;
