use serde::Serialize;
use uuid::Uuid;

/// Why a file's content was not stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The host could not deliver the file text
    Fetch(String),
    /// The text produced no chunks
    Empty,
    /// The embedding service failed for this file
    Embedding(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Fetch(e) => write!(f, "fetch failed: {}", e),
            SkipReason::Empty => write!(f, "no content"),
            SkipReason::Embedding(e) => write!(f, "embedding failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub repo_id: Uuid,
    /// Paths reported by the host
    pub listed: usize,
    /// Paths that passed the inclusion filter and became File records
    pub retained: usize,
    /// Files whose chunks were stored
    pub embedded_files: usize,
    pub chunks: usize,
    /// Distinct dependency edges created by this run
    pub edges: usize,
    pub skipped: Vec<SkippedFile>,
}

impl IngestReport {
    pub fn new(repo_id: Uuid, listed: usize, retained: usize) -> Self {
        Self {
            repo_id,
            listed,
            retained,
            embedded_files: 0,
            chunks: 0,
            edges: 0,
            skipped: Vec::new(),
        }
    }

    pub fn skip(&mut self, path: &str, reason: SkipReason) {
        self.skipped.push(SkippedFile {
            path: path.to_string(),
            reason,
        });
    }

    /// Skips other than empty files
    pub fn failures(&self) -> impl Iterator<Item = &SkippedFile> {
        self.skipped.iter().filter(|s| s.reason != SkipReason::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_exclude_empty_files() {
        let mut report = IngestReport::new(Uuid::new_v4(), 3, 3);
        report.skip("empty.py", SkipReason::Empty);
        report.skip("gone.py", SkipReason::Fetch("404".into()));

        let failures: Vec<_> = report.failures().map(|s| s.path.as_str()).collect();
        assert_eq!(failures, vec!["gone.py"]);
        assert_eq!(report.skipped[1].reason.to_string(), "fetch failed: 404");
    }

    #[test]
    fn test_report_serializes_skip_reasons() {
        let mut report = IngestReport::new(Uuid::nil(), 1, 1);
        report.skip("a.py", SkipReason::Embedding("timeout".into()));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"][0]["reason"]["kind"], "embedding");
        assert_eq!(json["skipped"][0]["reason"]["detail"], "timeout");
    }
}
