//! Data model - repositories, files and chunks
//!
//! A repository owns files, a file owns ordered chunks. Files carry no
//! content of their own; their text lives in the chunks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ingested repository. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub branch: String,
    pub user_id: Option<String>,
}

impl Repository {
    /// Create a repository record with a fresh id
    pub fn new(owner: &str, name: &str, branch: &str, user_id: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            name: name.to_string(),
            branch: branch.to_string(),
            user_id: user_id.map(str::to_string),
        }
    }

    /// `owner/name@branch`
    pub fn display_name(&self) -> String {
        format!("{}/{}@{}", self.owner, self.name, self.branch)
    }
}

/// A file of a repository, unique per (repository, path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    pub repo_id: Uuid,
    pub path: String,
}

/// A chunk about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewChunk {
    pub repo_id: Uuid,
    pub path: String,
    pub chunk_index: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// A chunk as read back for retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub file_path: String,
    pub chunk_index: usize,
    pub content: String,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl StoredChunk {
    pub fn key(&self) -> ChunkKey {
        ChunkKey {
            file_path: self.file_path.clone(),
            chunk_index: self.chunk_index,
        }
    }
}

/// Identity of a chunk within a repository: (file path, chunk index)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub file_path: String,
    pub chunk_index: usize,
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.file_path, self.chunk_index)
    }
}

/// Parameters of an ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub user_id: Option<String>,
}

impl IngestRequest {
    pub fn new(owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }
}
