//! Ingestion pipeline

use super::report::{IngestReport, SkipReason};
use crate::chunker::TokenChunker;
use crate::config::RepolensConfig;
use crate::edge::DependencyEdge;
use crate::filter::FileFilter;
use crate::imports::ImportResolver;
use crate::model::{IngestRequest, NewChunk, Repository};
use crate::services::{Embedder, RepositoryHost};
use crate::storage::GraphStore;
use crate::ui::{ProgressMessage, ProgressPhase};
use crate::Result;
use crossbeam::channel::Sender;
use std::collections::HashSet;
use uuid::Uuid;

/// Builds the knowledge graph of one repository
pub struct IngestionPipeline<'a> {
    host: &'a dyn RepositoryHost,
    embedder: &'a dyn Embedder,
    store: &'a dyn GraphStore,
    chunker: TokenChunker,
    resolver: ImportResolver,
    filter: FileFilter,
    progress: Option<Sender<ProgressMessage>>,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(
        host: &'a dyn RepositoryHost,
        embedder: &'a dyn Embedder,
        store: &'a dyn GraphStore,
        chunker: TokenChunker,
        resolver: ImportResolver,
        filter: FileFilter,
    ) -> Self {
        Self {
            host,
            embedder,
            store,
            chunker,
            resolver,
            filter,
            progress: None,
        }
    }

    /// Wire chunker, resolver and filter from the configuration
    pub fn from_config(
        host: &'a dyn RepositoryHost,
        embedder: &'a dyn Embedder,
        store: &'a dyn GraphStore,
        config: &RepolensConfig,
    ) -> Result<Self> {
        Ok(Self::new(
            host,
            embedder,
            store,
            TokenChunker::new(config.chunking)?,
            ImportResolver::new(&config.resolver),
            FileFilter::new(&config.ingest.exclude),
        ))
    }

    /// Publish progress messages on a channel
    pub fn with_progress(mut self, tx: Sender<ProgressMessage>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Ingest a repository and return its id
    pub fn ingest(&self, owner: &str, repo: &str, branch: &str, user_id: Option<&str>) -> Result<Uuid> {
        let mut request = IngestRequest::new(owner, repo, branch);
        if let Some(user) = user_id {
            request = request.with_user(user);
        }
        Ok(self.run(&request)?.repo_id)
    }

    /// Ingest a repository and report what was stored and skipped
    pub fn run(&self, request: &IngestRequest) -> Result<IngestReport> {
        // Phase 1: registration
        let repo = Repository::new(&request.owner, &request.repo, &request.branch, request.user_id.as_deref());
        self.store.create_repository(&repo)?;
        tracing::info!("Registered {} as {}", repo.display_name(), repo.id);

        // Phase 2: enumeration and filtering
        self.notify(ProgressMessage::Started { phase: ProgressPhase::Listing, total: 0 });
        let listed = self.host.list_paths(&repo.owner, &repo.name, &repo.branch)?;
        let listed_count = listed.len();
        let retained = self.filter.retain(listed);
        self.notify(ProgressMessage::Finished { phase: ProgressPhase::Listing });
        tracing::info!("{} of {} listed files retained", retained.len(), listed_count);

        for path in &retained {
            self.store.merge_file(repo.id, path)?;
        }

        // Phase 3: content pass
        let known: HashSet<String> = retained.iter().cloned().collect();
        let mut report = IngestReport::new(repo.id, listed_count, retained.len());

        self.notify(ProgressMessage::Started { phase: ProgressPhase::Processing, total: retained.len() });
        for (i, path) in retained.iter().enumerate() {
            self.notify(ProgressMessage::Progress {
                phase: ProgressPhase::Processing,
                current: i + 1,
                file: Some(path.clone()),
            });
            self.process_file(&repo, path, &known, &mut report)?;
        }
        self.notify(ProgressMessage::Finished { phase: ProgressPhase::Processing });

        tracing::info!(
            "Ingested {}: {} chunks, {} edges, {} files skipped",
            repo.display_name(),
            report.chunks,
            report.edges,
            report.skipped.len()
        );
        Ok(report)
    }

    fn process_file(&self, repo: &Repository, path: &str, known: &HashSet<String>, report: &mut IngestReport) -> Result<()> {
        let text = match self.host.fetch_text(&repo.owner, &repo.name, path, &repo.branch) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path, e);
                self.skip(report, path, SkipReason::Fetch(e.to_string()));
                return Ok(());
            }
        };

        self.store_chunks(repo, path, &text, report)?;
        self.link_imports(repo, path, &text, known, report)
    }

    fn store_chunks(&self, repo: &Repository, path: &str, text: &str, report: &mut IngestReport) -> Result<()> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            tracing::debug!("No content in {}", path);
            self.skip(report, path, SkipReason::Empty);
            return Ok(());
        }

        let embeddings = match self.embedder.embed(&chunks) {
            Ok(vectors) if vectors.len() == chunks.len() => vectors,
            Ok(vectors) => {
                let reason = format!("expected {} vectors, got {}", chunks.len(), vectors.len());
                tracing::warn!("Skipping chunks of {}: {}", path, reason);
                self.skip(report, path, SkipReason::Embedding(reason));
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Skipping chunks of {}: {}", path, e);
                self.skip(report, path, SkipReason::Embedding(e.to_string()));
                return Ok(());
            }
        };

        let new_chunks: Vec<NewChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(chunk_index, (content, embedding))| NewChunk {
                repo_id: repo.id,
                path: path.to_string(),
                chunk_index,
                content,
                embedding,
            })
            .collect();

        self.store.create_chunks(&new_chunks)?;
        tracing::debug!("Stored {} chunks for {}", new_chunks.len(), path);
        report.embedded_files += 1;
        report.chunks += new_chunks.len();
        Ok(())
    }

    fn link_imports(
        &self,
        repo: &Repository,
        path: &str,
        text: &str,
        known: &HashSet<String>,
        report: &mut IngestReport,
    ) -> Result<()> {
        for target in self.resolver.resolve_imports(path, text, known) {
            let edge = DependencyEdge::new(repo.id, path, &target);
            if edge.is_self_loop() {
                continue;
            }
            if self.store.merge_dependency(&edge)? {
                tracing::debug!("Edge {}", edge);
                report.edges += 1;
            }
        }
        Ok(())
    }

    fn skip(&self, report: &mut IngestReport, path: &str, reason: SkipReason) {
        self.notify(ProgressMessage::Skipped {
            file: path.to_string(),
            reason: reason.to_string(),
        });
        report.skip(path, reason);
    }

    fn notify(&self, msg: ProgressMessage) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkingConfig;
    use crate::storage::SqliteStore;
    use crate::Error;
    use std::collections::BTreeMap;

    /// In-memory host; `None` content makes the fetch fail
    struct FakeHost {
        files: BTreeMap<String, Option<String>>,
        listing_fails: bool,
    }

    impl FakeHost {
        fn new(files: &[(&str, Option<&str>)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.map(str::to_string)))
                    .collect(),
                listing_fails: false,
            }
        }
    }

    impl RepositoryHost for FakeHost {
        fn list_paths(&self, _owner: &str, _repo: &str, _branch: &str) -> Result<Vec<String>> {
            if self.listing_fails {
                return Err(Error::Host("listing unavailable".into()));
            }
            Ok(self.files.keys().cloned().collect())
        }

        fn fetch_text(&self, _owner: &str, _repo: &str, path: &str, _branch: &str) -> Result<String> {
            self.files
                .get(path)
                .cloned()
                .flatten()
                .ok_or_else(|| Error::Host(format!("{} unavailable", path)))
        }
    }

    /// Two-dimensional vectors; texts containing `poison` fail
    struct FakeEmbedder;

    impl Embedder for FakeEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.iter().any(|t| t.contains("poison")) {
                return Err(Error::Embedding("model rejected input".into()));
            }
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    fn pipeline<'a>(host: &'a FakeHost, store: &'a SqliteStore) -> IngestionPipeline<'a> {
        IngestionPipeline::new(
            host,
            &FakeEmbedder,
            store,
            TokenChunker::new(ChunkingConfig::default()).unwrap(),
            ImportResolver::default(),
            FileFilter::default(),
        )
    }

    #[test]
    fn test_partial_fetch_failure() {
        let host = FakeHost::new(&[
            ("app/a.py", Some("from .c import run\nrun()\n")),
            ("app/b.py", None),
            ("app/c.py", Some("import app.a\ndef run(): pass\n")),
        ]);
        let store = SqliteStore::open_in_memory().unwrap();

        let report = pipeline(&host, &store).run(&IngestRequest::new("acme", "shop", "main")).unwrap();

        assert!(store.get_repository(report.repo_id).unwrap().is_some());
        assert_eq!(store.list_files(report.repo_id).unwrap().len(), 3);

        let chunked: HashSet<_> = store
            .read_chunks(report.repo_id)
            .unwrap()
            .into_iter()
            .map(|c| c.file_path)
            .collect();
        assert_eq!(chunked, HashSet::from(["app/a.py".to_string(), "app/c.py".to_string()]));

        assert_eq!(report.edges, 2);
        assert!(store.read_neighbors(report.repo_id, "app/a.py", 1).unwrap().contains("app/c.py"));
        assert!(store.read_neighbors(report.repo_id, "app/c.py", 1).unwrap().contains("app/a.py"));

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, "app/b.py");
        assert!(matches!(report.skipped[0].reason, SkipReason::Fetch(_)));
    }

    #[test]
    fn test_filtered_paths_get_no_file_record() {
        let host = FakeHost::new(&[
            ("src/index.js", Some("import './util';\n")),
            ("src/util.js", Some("export const x = 1;\n")),
            ("node_modules/react/index.js", Some("module.exports = {};\n")),
            ("logo.png", Some("binary")),
        ]);
        let store = SqliteStore::open_in_memory().unwrap();

        let report = pipeline(&host, &store).run(&IngestRequest::new("acme", "web", "main")).unwrap();

        assert_eq!(report.listed, 4);
        assert_eq!(report.retained, 2);
        let files: Vec<_> = store.list_files(report.repo_id).unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(files, vec!["src/index.js", "src/util.js"]);
        assert_eq!(report.edges, 1);
    }

    #[test]
    fn test_embedding_failure_keeps_imports() {
        let host = FakeHost::new(&[
            ("a.py", Some("import b\n# poison\n")),
            ("b.py", Some("VALUE = 1\n")),
        ]);
        let store = SqliteStore::open_in_memory().unwrap();

        let report = pipeline(&host, &store).run(&IngestRequest::new("acme", "lib", "main")).unwrap();

        let chunks = store.read_chunks(report.repo_id).unwrap();
        assert!(chunks.iter().all(|c| c.file_path == "b.py"));
        assert_eq!(report.embedded_files, 1);
        assert_eq!(report.edges, 1);
        assert!(matches!(report.skipped[0].reason, SkipReason::Embedding(_)));
    }

    #[test]
    fn test_empty_file_is_not_a_failure() {
        let host = FakeHost::new(&[("pkg/__init__.py", Some("")), ("pkg/core.py", Some("x = 1\n"))]);
        let store = SqliteStore::open_in_memory().unwrap();

        let report = pipeline(&host, &store).run(&IngestRequest::new("acme", "pkg", "main")).unwrap();

        assert_eq!(report.chunks, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::Empty);
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_duplicate_and_self_imports() {
        let host = FakeHost::new(&[
            ("a.py", Some("import b\nfrom b import x\nimport a\n")),
            ("b.py", Some("x = 1\n")),
        ]);
        let store = SqliteStore::open_in_memory().unwrap();

        let report = pipeline(&host, &store).run(&IngestRequest::new("acme", "dup", "main")).unwrap();

        assert_eq!(report.edges, 1);
        assert_eq!(store.stats(Some(report.repo_id)).unwrap().dependencies, 1);
    }

    #[test]
    fn test_chunk_indexes_are_contiguous() {
        let body = "def handler(request):\n    return request\n".repeat(200);
        let host = FakeHost::new(&[("big.py", Some(body.as_str()))]);
        let store = SqliteStore::open_in_memory().unwrap();

        let report = pipeline(&host, &store).run(&IngestRequest::new("acme", "big", "main")).unwrap();

        let indexes: Vec<_> = store.read_chunks(report.repo_id).unwrap().into_iter().map(|c| c.chunk_index).collect();
        assert!(indexes.len() > 1);
        assert_eq!(indexes, (0..indexes.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_listing_failure_is_fatal_after_registration() {
        let mut host = FakeHost::new(&[("a.py", Some("x = 1\n"))]);
        host.listing_fails = true;
        let store = SqliteStore::open_in_memory().unwrap();

        let result = pipeline(&host, &store).ingest("acme", "down", "main", Some("user-7"));

        assert!(matches!(result, Err(Error::Host(_))));
        let repos = store.list_repositories().unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].user_id.as_deref(), Some("user-7"));
        assert_eq!(store.stats(None).unwrap().files, 0);
    }

    #[test]
    fn test_progress_messages() {
        let host = FakeHost::new(&[("a.py", Some("x = 1\n")), ("b.py", None)]);
        let store = SqliteStore::open_in_memory().unwrap();
        let (tx, rx) = crossbeam::channel::unbounded();

        pipeline(&host, &store)
            .with_progress(tx)
            .run(&IngestRequest::new("acme", "p", "main"))
            .unwrap();

        let messages: Vec<_> = rx.try_iter().collect();
        assert!(messages.contains(&ProgressMessage::Started { phase: ProgressPhase::Processing, total: 2 }));
        assert!(messages.iter().any(|m| matches!(m, ProgressMessage::Skipped { file, .. } if file == "b.py")));
        assert_eq!(messages.last(), Some(&ProgressMessage::Finished { phase: ProgressPhase::Processing }));
    }
}
