//! SQLite storage implementation

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use uuid::Uuid;
use crate::Result;
use crate::edge::DependencyEdge;
use crate::model::{FileRecord, NewChunk, Repository, StoredChunk};
use super::{schema, GraphStore};

/// SQLite-backed graph store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Direct dependency targets of one file
    fn dependencies_of(&self, repo_id: Uuid, path: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT dst_path FROM dependencies WHERE repo_id = ?1 AND src_path = ?2 ORDER BY dst_path"
        )?;

        let targets = stmt
            .query_map(params![repo_id.to_string(), path], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(targets)
    }

    /// Count rows of a table, optionally restricted to one repository
    fn count(&self, table: &str, repo_column: &str, repo_id: Option<Uuid>) -> Result<usize> {
        let count: i64 = match repo_id {
            Some(id) => self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, repo_column),
                [id.to_string()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    /// Helper to convert a row to a Repository
    fn row_to_repository(row: &rusqlite::Row) -> rusqlite::Result<Repository> {
        Ok(Repository {
            id: parse_uuid(row, 0)?,
            owner: row.get(1)?,
            name: row.get(2)?,
            branch: row.get(3)?,
            user_id: row.get(4)?,
        })
    }
}

impl GraphStore for SqliteStore {
    fn create_repository(&self, repo: &Repository) -> Result<()> {
        self.conn.execute(
            "INSERT INTO repositories (id, owner, name, branch, user_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![repo.id.to_string(), repo.owner, repo.name, repo.branch, repo.user_id],
        )?;
        Ok(())
    }

    fn get_repository(&self, id: Uuid) -> Result<Option<Repository>> {
        self.conn
            .query_row(
                "SELECT id, owner, name, branch, user_id FROM repositories WHERE id = ?1",
                [id.to_string()],
                Self::row_to_repository,
            )
            .optional()
            .map_err(Into::into)
    }

    fn list_repositories(&self) -> Result<Vec<Repository>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, name, branch, user_id FROM repositories ORDER BY owner, name, branch"
        )?;

        let repos = stmt
            .query_map([], Self::row_to_repository)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(repos)
    }

    fn merge_file(&self, repo_id: Uuid, path: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO files (repo_id, path) VALUES (?1, ?2)",
            params![repo_id.to_string(), path],
        )?;
        Ok(())
    }

    fn list_files(&self, repo_id: Uuid) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare("SELECT path FROM files WHERE repo_id = ?1 ORDER BY path")?;

        let files = stmt
            .query_map([repo_id.to_string()], |row| {
                Ok(FileRecord { repo_id, path: row.get(0)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(files)
    }

    fn create_chunk(&self, chunk: &NewChunk) -> Result<()> {
        insert_chunk(&self.conn, chunk)
    }

    fn create_chunks(&self, chunks: &[NewChunk]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for chunk in chunks {
            insert_chunk(&tx, chunk)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn merge_dependency(&self, edge: &DependencyEdge) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO dependencies (repo_id, src_path, dst_path) VALUES (?1, ?2, ?3)",
            params![edge.repo_id.to_string(), edge.from_path, edge.to_path],
        )?;
        Ok(inserted > 0)
    }

    fn read_chunks(&self, repo_id: Uuid) -> Result<Vec<StoredChunk>> {
        let mut stmt = self.conn.prepare(
            "SELECT path, chunk_index, content, embedding FROM chunks WHERE repo_id = ?1 ORDER BY id"
        )?;

        let chunks = stmt
            .query_map([repo_id.to_string()], |row| {
                let chunk_index: i64 = row.get(1)?;
                let blob: Vec<u8> = row.get(3)?;
                Ok(StoredChunk {
                    file_path: row.get(0)?,
                    chunk_index: chunk_index as usize,
                    content: row.get(2)?,
                    embedding: blob_to_vector(&blob),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(chunks)
    }

    fn read_neighbors(&self, repo_id: Uuid, path: &str, max_depth: usize) -> Result<BTreeSet<String>> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut results = BTreeSet::new();

        queue.push_back((path.to_string(), 0usize));
        visited.insert(path.to_string());

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= max_depth {
                continue;
            }

            for next in self.dependencies_of(repo_id, &current)? {
                if visited.insert(next.clone()) {
                    results.insert(next.clone());

                    if current_depth + 1 < max_depth {
                        queue.push_back((next, current_depth + 1));
                    }
                }
            }
        }

        Ok(results)
    }

    fn stats(&self, repo_id: Option<Uuid>) -> Result<DbStats> {
        Ok(DbStats {
            repositories: self.count("repositories", "id", repo_id)?,
            files: self.count("files", "repo_id", repo_id)?,
            chunks: self.count("chunks", "repo_id", repo_id)?,
            dependencies: self.count("dependencies", "repo_id", repo_id)?,
        })
    }
}

fn insert_chunk(conn: &Connection, chunk: &NewChunk) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO chunks (repo_id, path, chunk_index, content, embedding)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            chunk.repo_id.to_string(),
            chunk.path,
            chunk.chunk_index as i64,
            chunk.content,
            vector_to_blob(&chunk.embedding),
        ],
    )?;
    Ok(())
}

fn parse_uuid(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Little-endian f32 encoding
fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub repositories: usize,
    pub files: usize,
    pub chunks: usize,
    pub dependencies: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Repositories: {}", self.repositories)?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Chunks: {}", self.chunks)?;
        writeln!(f, "  Dependencies: {}", self.dependencies)
    }
}
