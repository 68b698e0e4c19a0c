//! Stage orchestration and domain logic for tubedigest.
//!
//! This crate ties the catalog, store, inference, and report layers into
//! the pipeline stages (discovery, fetch, transform, aggregation) plus the
//! one-shot maintenance utilities.

pub mod aggregate;
pub mod discovery;
pub mod fetch;
pub mod maintenance;
pub mod naming;
pub mod progress;
pub mod transform;
