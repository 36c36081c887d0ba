//! Dependency edges between files
//!
//! A `DependencyEdge` records that an import statement in `from_path`
//! resolves to `to_path`. Edges never cross repositories: both endpoints
//! come from the same ingested file set.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed file-to-file dependency within one repository.
///
/// Edges form a set: repeated imports between the same pair collapse into
/// one edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub repo_id: Uuid,
    /// Importing file
    pub from_path: String,
    /// Imported file
    pub to_path: String,
}

impl DependencyEdge {
    pub fn new(repo_id: Uuid, from_path: &str, to_path: &str) -> Self {
        Self {
            repo_id,
            from_path: from_path.to_string(),
            to_path: to_path.to_string(),
        }
    }

    /// A file importing itself
    pub fn is_self_loop(&self) -> bool {
        self.from_path == self.to_path
    }
}

impl std::fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from_path, self.to_path)
    }
}
