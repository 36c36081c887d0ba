//! Retrieval engine implementation
//!
//! Provides the query-side operations:
//! - `search`: embed the question, score every chunk, diversified top-k
//! - `retrieve`: `search` plus dependency-neighbor expansion
//! - `answer`: `retrieve`, prompt assembly and text generation

use super::prompt::PromptAssembler;
use super::similarity::{diversify, rank_chunks, ScoredChunk};
use crate::config::RetrievalConfig;
use crate::services::{Embedder, Generator};
use crate::storage::GraphStore;
use crate::{Error, Result};
use serde::Serialize;
use uuid::Uuid;

/// Dependency neighbors of one file that contributed a selected chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNeighbors {
    pub path: String,
    pub neighbors: Vec<String>,
}

/// Selected chunks plus their graph context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Retrieval {
    pub chunks: Vec<ScoredChunk>,
    pub graph: Vec<FileNeighbors>,
}

impl Retrieval {
    /// Distinct files of the selected chunks, in first-appearance order
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        for chunk in &self.chunks {
            if !files.contains(&chunk.chunk.file_path.as_str()) {
                files.push(&chunk.chunk.file_path);
            }
        }
        files
    }
}

/// Graph-augmented retrieval over one store
pub struct RetrievalEngine<'a> {
    store: &'a dyn GraphStore,
    embedder: &'a dyn Embedder,
    generator: Option<&'a dyn Generator>,
    config: RetrievalConfig,
    prompt: PromptAssembler,
}

impl<'a> RetrievalEngine<'a> {
    /// Create an engine that can search and retrieve
    pub fn new(store: &'a dyn GraphStore, embedder: &'a dyn Embedder, config: RetrievalConfig) -> Self {
        Self {
            store,
            embedder,
            generator: None,
            config,
            prompt: PromptAssembler::new(),
        }
    }

    /// Attach the text-generation service used by `answer`
    pub fn with_generator(mut self, generator: &'a dyn Generator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Diversified top-k chunks for a question
    pub fn search(&self, repo_id: Uuid, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        self.check_request(repo_id, k)?;
        self.search_unchecked(repo_id, question, k)
    }

    /// Top-k chunks and the dependency neighbors of their files
    pub fn retrieve(&self, repo_id: Uuid, question: &str, k: usize) -> Result<Retrieval> {
        self.check_request(repo_id, k)?;
        self.retrieve_unchecked(repo_id, question, k)
    }

    /// Answer a question about a repository
    pub fn answer(&self, repo_id: Uuid, question: &str, k: usize) -> Result<String> {
        self.check_request(repo_id, k)?;
        let generator = self
            .generator
            .ok_or_else(|| Error::Config("no text generation service configured".into()))?;

        let retrieval = self.retrieve_unchecked(repo_id, question, k)?;
        let prompt = self.prompt.assemble(question, &retrieval.chunks, &retrieval.graph);
        tracing::debug!("Prompt of {} bytes from {} chunks", prompt.len(), retrieval.chunks.len());

        generator.generate(&prompt)
    }

    /// Reject bad `k` and unknown repositories before any service call
    fn check_request(&self, repo_id: Uuid, k: usize) -> Result<()> {
        if k == 0 || k > self.config.max_top_k {
            return Err(Error::InvalidArgument(format!(
                "top_k must be between 1 and {}, got {}",
                self.config.max_top_k, k
            )));
        }
        if self.store.get_repository(repo_id)?.is_none() {
            return Err(Error::RepositoryNotFound(repo_id));
        }
        Ok(())
    }

    fn search_unchecked(&self, repo_id: Uuid, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query = self.embedder.embed_one(question)?;
        let chunks = self.store.read_chunks(repo_id)?;
        let loaded = chunks.len();

        let mut ranked = rank_chunks(&query, chunks);
        let scored = ranked.len();
        ranked.truncate(k.saturating_mul(self.config.fetch_multiplier.max(1)));
        tracing::debug!("Scored {} of {} chunks, pool of {}", scored, loaded, ranked.len());

        Ok(diversify(&ranked, k))
    }

    fn retrieve_unchecked(&self, repo_id: Uuid, question: &str, k: usize) -> Result<Retrieval> {
        let chunks = self.search_unchecked(repo_id, question, k)?;
        let mut retrieval = Retrieval { chunks, graph: Vec::new() };

        let mut graph = Vec::new();
        for path in retrieval.files() {
            let neighbors = self.store.read_neighbors(repo_id, path, self.config.neighbor_depth)?;
            graph.push(FileNeighbors {
                path: path.to_string(),
                neighbors: neighbors.into_iter().collect(),
            });
        }
        retrieval.graph = graph;

        Ok(retrieval)
    }
}
