//! External services consumed by ingestion and retrieval
//!
//! Each concern sits behind a trait so the pipeline and the retrieval engine
//! never depend on a particular provider:
//! - `RepositoryHost`: file listings and file text
//! - `Embedder`: text -> vector
//! - `Generator`: prompt -> answer

pub mod embedding;
pub mod generation;
pub mod host;

pub use embedding::{embedder_from_config, Embedder, FastEmbedder, OllamaEmbedder, OpenAiEmbedder};
pub use generation::{generator_from_config, Generator, OllamaGenerator, OpenAiGenerator};
pub use host::{GithubHost, LocalHost, RepositoryHost};

use crate::{Error, Result};

fn openai_api_key() -> Result<String> {
    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".into()))
}
