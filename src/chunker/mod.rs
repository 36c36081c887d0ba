//! Token-window chunker
//!
//! Every ingested file is cut into windows of at most `max_tokens` tokens.
//! Consecutive windows share exactly `overlap` tokens; the last window ends
//! at the end of the token stream and may be shorter.

pub mod tokenizer;

pub use tokenizer::{Cl100kTokenizer, Tokenizer};

use crate::config::ChunkingConfig;
use crate::Result;
use std::ops::Range;

/// Compute the token ranges of each window over a stream of `token_count` tokens.
///
/// Callers must pass `overlap < max_tokens`; `ChunkingConfig::validate` enforces it.
pub fn token_windows(token_count: usize, max_tokens: usize, overlap: usize) -> Vec<Range<usize>> {
    let mut windows = Vec::new();
    let mut start = 0;

    while start < token_count {
        let end = (start + max_tokens).min(token_count);
        windows.push(start..end);
        if end == token_count {
            break;
        }
        start = end - overlap;
    }

    windows
}

/// Splits text into overlapping token windows
pub struct TokenChunker {
    config: ChunkingConfig,
    tokenizer: Box<dyn Tokenizer>,
}

impl TokenChunker {
    /// Create a chunker over the `cl100k_base` vocabulary
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        Self::with_tokenizer(config, Box::new(Cl100kTokenizer::new()?))
    }

    /// Create a chunker with a custom tokenizer
    pub fn with_tokenizer(config: ChunkingConfig, tokenizer: Box<dyn Tokenizer>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, tokenizer })
    }

    pub fn max_tokens(&self) -> usize {
        self.config.max_tokens
    }

    pub fn overlap(&self) -> usize {
        self.config.overlap
    }

    /// Token ranges of the windows for a stream of `token_count` tokens
    pub fn windows(&self, token_count: usize) -> Vec<Range<usize>> {
        token_windows(token_count, self.config.max_tokens, self.config.overlap)
    }

    /// Chunk text into ordered windows. Empty text yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenizer.encode(text);
        self.windows(tokens.len())
            .into_iter()
            .map(|range| self.tokenizer.decode(&tokens[range]))
            .collect()
    }
}
