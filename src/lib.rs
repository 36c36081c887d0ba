//! # Repolens - Repository knowledge base
//!
//! Turns a source repository into a queryable knowledge base.
//!
//! Repolens provides:
//! - Overlapping token-window chunking of every text file
//! - Pattern-based import detection and resolution into a file dependency graph
//! - SQLite-backed graph store for repositories, files, chunks and dependency edges
//! - Graph-augmented retrieval: cosine scoring, per-file diversification and
//!   dependency-neighbor expansion feeding a text-generation service

pub mod config;
pub mod filter;
pub mod model;
pub mod edge;
pub mod chunker;
pub mod imports;
pub mod storage;
pub mod services;
pub mod ingest;
pub mod query;
pub mod ui;

// Re-exports for convenient access
pub use chunker::TokenChunker;
pub use filter::FileFilter;
pub use edge::DependencyEdge;
pub use imports::ImportResolver;
pub use ingest::{IngestionPipeline, IngestReport};
pub use model::{ChunkKey, FileRecord, IngestRequest, NewChunk, Repository, StoredChunk};
pub use query::{PromptAssembler, RetrievalEngine};
pub use storage::{GraphStore, SqliteStore};

/// Result type alias for Repolens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Repolens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository host error: {0}")]
    Host(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(uuid::Uuid),
}
