//! Ingestion - repository files into chunks, embeddings and dependency edges
//!
//! A run registers the repository, records every retained file, then walks
//! the files one at a time: fetch, chunk, embed, store, link imports.
//! Per-file failures are recorded in the `IngestReport` and never abort the
//! run; listing, registration and store failures do.

pub mod pipeline;
pub mod report;

pub use pipeline::IngestionPipeline;
pub use report::{IngestReport, SkipReason, SkippedFile};
