//! Database schema definitions

/// SQL to create the repositories table
pub const CREATE_REPOSITORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS repositories (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    name TEXT NOT NULL,
    branch TEXT NOT NULL,
    user_id TEXT
)
"#;

/// SQL to create the files table
/// One row per (repository, path): the Repository -> File containment edge
pub const CREATE_FILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    repo_id TEXT NOT NULL REFERENCES repositories(id),
    path TEXT NOT NULL,
    PRIMARY KEY (repo_id, path)
)
"#;

/// SQL to create the chunks table
pub const CREATE_CHUNKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_id TEXT NOT NULL,
    path TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    FOREIGN KEY (repo_id, path) REFERENCES files(repo_id, path)
)
"#;

/// SQL to create the dependencies table
pub const CREATE_DEPENDENCIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS dependencies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_id TEXT NOT NULL,
    src_path TEXT NOT NULL,
    dst_path TEXT NOT NULL,
    UNIQUE(repo_id, src_path, dst_path),
    FOREIGN KEY (repo_id, src_path) REFERENCES files(repo_id, path),
    FOREIGN KEY (repo_id, dst_path) REFERENCES files(repo_id, path)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_chunks_repo ON chunks(repo_id)",
    "CREATE INDEX IF NOT EXISTS idx_chunks_file ON chunks(repo_id, path)",
    "CREATE INDEX IF NOT EXISTS idx_dependencies_src ON dependencies(repo_id, src_path)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_REPOSITORIES_TABLE,
        CREATE_FILES_TABLE,
        CREATE_CHUNKS_TABLE,
        CREATE_DEPENDENCIES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
