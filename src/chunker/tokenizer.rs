//! Tokenizers used to measure chunk windows

use crate::{Error, Result};
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Longest run of tokens that can make up a single UTF-8 character
const MAX_TOKENS_PER_CHAR: usize = 4;

/// A deterministic, reversible text tokenizer
pub trait Tokenizer {
    /// Split text into token ids
    fn encode(&self, text: &str) -> Vec<usize>;

    /// Turn a run of token ids back into text.
    ///
    /// Must not fail: bytes that do not form valid UTF-8 on their own (a
    /// window boundary that cuts a multi-byte character) become U+FFFD.
    fn decode(&self, tokens: &[usize]) -> String;
}

/// `cl100k_base` byte-pair encoding
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    pub fn new() -> Result<Self> {
        let bpe = cl100k_base()
            .map_err(|e| Error::Tokenizer(format!("Failed to load cl100k_base: {}", e)))?;
        Ok(Self { bpe })
    }

    /// Decode piecewise, taking the shortest run that forms valid text
    fn decode_lossy(&self, tokens: &[usize]) -> String {
        let mut out = String::new();
        let mut i = 0;

        while i < tokens.len() {
            let limit = (i + MAX_TOKENS_PER_CHAR).min(tokens.len());
            let decoded = ((i + 1)..=limit)
                .find_map(|end| self.bpe.decode(tokens[i..end].to_vec()).ok().map(|s| (end, s)));

            match decoded {
                Some((end, text)) => {
                    out.push_str(&text);
                    i = end;
                }
                None => {
                    out.push(char::REPLACEMENT_CHARACTER);
                    i += 1;
                }
            }
        }

        out
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn encode(&self, text: &str) -> Vec<usize> {
        // Special-token markers in source files are plain text here
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[usize]) -> String {
        match self.bpe.decode(tokens.to_vec()) {
            Ok(text) => text,
            Err(_) => self.decode_lossy(tokens),
        }
    }
}
