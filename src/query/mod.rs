//! Query Engine - graph-augmented retrieval over the stored chunks

pub mod engine;
pub mod prompt;
pub mod similarity;

pub use engine::{FileNeighbors, Retrieval, RetrievalEngine};
pub use prompt::PromptAssembler;
pub use similarity::{cosine_similarity, diversify, rank_chunks, ScoredChunk};
