//! Inclusion filter for repository paths
//!
//! A path is retained when it sits outside every ignored directory, does not
//! carry a binary/media extension and does carry a known text extension.
//! Extra gitignore-style excludes from the config are layered on top.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Directory fragments whose contents are never ingested
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules/", ".git/", "dist/", "build/", "__pycache__/",
    ".venv/", "venv/", ".next/", "coverage/", ".cache/",
];

/// Binary and media extensions
pub const BINARY_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico",
    ".pdf", ".zip", ".tar", ".gz",
    ".woff", ".woff2", ".ttf", ".eot",
];

/// Text, code, config and documentation extensions
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // Code
    ".py", ".pyi", ".js", ".mjs", ".cjs", ".ts", ".jsx", ".tsx",
    // Web
    ".html", ".css", ".scss", ".sass", ".less",
    // Config
    ".json", ".yaml", ".yml", ".toml", ".ini",
    // Docs
    ".md", ".rst", ".txt",
    // Other
    ".sql", ".sh", ".bash",
];

pub struct FileFilter {
    extra: Gitignore,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self { extra: Gitignore::empty() }
    }
}

impl FileFilter {
    /// Build a filter with additional gitignore-style exclude patterns
    pub fn new(extra_excludes: &[String]) -> Self {
        if extra_excludes.is_empty() {
            return Self::default();
        }

        let mut builder = GitignoreBuilder::new("");
        for pattern in extra_excludes {
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!("Ignoring invalid exclude pattern {:?}: {}", pattern, e);
            }
        }

        Self {
            extra: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    /// Decide whether a repository-relative path should be ingested
    pub fn should_process(&self, path: &str) -> bool {
        if BINARY_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return false;
        }

        if IGNORED_DIRS.iter().any(|dir| path.contains(dir)) {
            return false;
        }

        if !SUPPORTED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return false;
        }

        !self
            .extra
            .matched_path_or_any_parents(Path::new(path), false)
            .is_ignore()
    }

    /// Retain the processable paths, preserving input order
    pub fn retain(&self, paths: Vec<String>) -> Vec<String> {
        paths.into_iter().filter(|p| self.should_process(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_files_pass() {
        let filter = FileFilter::default();
        assert!(filter.should_process("src/app.py"));
        assert!(filter.should_process("web/index.tsx"));
        assert!(filter.should_process("README.md"));
        assert!(filter.should_process("deploy/run.sh"));
        assert!(filter.should_process("stubs/client.pyi"));
        assert!(filter.should_process("scripts/build.mjs"));
        assert!(filter.should_process("config/jest.cjs"));
    }

    #[test]
    fn test_ignored_directories_are_skipped() {
        let filter = FileFilter::default();
        assert!(!filter.should_process("node_modules/react/index.js"));
        assert!(!filter.should_process("pkg/__pycache__/mod.py"));
        assert!(!filter.should_process("web/.next/server.js"));
        assert!(!filter.should_process("app/dist/bundle.js"));
    }

    #[test]
    fn test_binary_and_unknown_extensions_are_skipped() {
        let filter = FileFilter::default();
        assert!(!filter.should_process("assets/logo.png"));
        assert!(!filter.should_process("assets/icon.svg"));
        assert!(!filter.should_process("src/main.rs"));
        assert!(!filter.should_process("Makefile"));
    }

    #[test]
    fn test_extra_excludes() {
        let filter = FileFilter::new(&["docs/".to_string(), "*.sql".to_string()]);
        assert!(!filter.should_process("docs/guide.md"));
        assert!(!filter.should_process("db/schema.sql"));
        assert!(filter.should_process("src/guide.md"));
    }

    #[test]
    fn test_retain_preserves_order() {
        let filter = FileFilter::default();
        let kept = filter.retain(vec![
            "b.py".to_string(),
            "logo.png".to_string(),
            "a.js".to_string(),
        ]);
        assert_eq!(kept, vec!["b.py", "a.js"]);
    }
}
