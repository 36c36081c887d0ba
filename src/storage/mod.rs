//! Storage Layer - graph store for repositories, files, chunks and edges
//!
//! The system of record is SQLite with tables:
//! - repositories(id, owner, name, branch, user_id)
//! - files(repo_id, path)
//! - chunks(repo_id, path, chunk_index, content, embedding)
//! - dependencies(repo_id, src_path, dst_path)
//!
//! Ingestion and retrieval only see the `GraphStore` trait.

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};

use crate::edge::DependencyEdge;
use crate::model::{FileRecord, NewChunk, Repository, StoredChunk};
use crate::Result;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Persistent graph of repositories, files, chunks and dependency edges.
///
/// File and dependency writes are idempotent merges; chunk writes append.
pub trait GraphStore {
    /// Register a repository node
    fn create_repository(&self, repo: &Repository) -> Result<()>;

    fn get_repository(&self, id: Uuid) -> Result<Option<Repository>>;

    fn list_repositories(&self) -> Result<Vec<Repository>>;

    /// Create the file node if it does not exist yet
    fn merge_file(&self, repo_id: Uuid, path: &str) -> Result<()>;

    fn list_files(&self, repo_id: Uuid) -> Result<Vec<FileRecord>>;

    /// Append one chunk under its file
    fn create_chunk(&self, chunk: &NewChunk) -> Result<()>;

    /// Append the chunks of one file
    fn create_chunks(&self, chunks: &[NewChunk]) -> Result<()> {
        for chunk in chunks {
            self.create_chunk(chunk)?;
        }
        Ok(())
    }

    /// Add a dependency edge. Returns false if it already existed.
    fn merge_dependency(&self, edge: &DependencyEdge) -> Result<bool>;

    /// All chunks of a repository, in insertion order
    fn read_chunks(&self, repo_id: Uuid) -> Result<Vec<StoredChunk>>;

    /// Files reachable from `path` over outgoing dependency edges within
    /// `max_depth` hops, excluding `path` itself
    fn read_neighbors(&self, repo_id: Uuid, path: &str, max_depth: usize) -> Result<BTreeSet<String>>;

    /// Node and edge counts, for one repository or the whole store
    fn stats(&self, repo_id: Option<Uuid>) -> Result<DbStats>;
}
