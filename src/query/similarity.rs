//! Similarity scoring and diversified top-k selection

use crate::model::{ChunkKey, StoredChunk};
use serde::Serialize;
use std::collections::HashSet;

/// A chunk with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    #[serde(flatten)]
    pub chunk: StoredChunk,
    pub score: f32,
}

/// Cosine similarity of two vectors.
///
/// `None` when the vectors differ in length, are empty, either has zero norm,
/// or the result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let score = dot_product / (norm_a * norm_b);
    score.is_finite().then_some(score)
}

/// Score every chunk against the query, best first.
///
/// Unscorable chunks are dropped. The sort is stable, so equal scores keep
/// load order.
pub fn rank_chunks(query: &[f32], chunks: Vec<StoredChunk>) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = chunks
        .into_iter()
        .filter_map(|chunk| {
            let score = cosine_similarity(query, &chunk.embedding)?;
            Some(ScoredChunk { chunk, score })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Pick at most `k` chunks from a ranked pool, one per file first.
///
/// The first pass takes the best chunk of each file in score order; the
/// second pass fills the remaining slots in score order regardless of file.
pub fn diversify(pool: &[ScoredChunk], k: usize) -> Vec<ScoredChunk> {
    let mut selected: Vec<ScoredChunk> = Vec::with_capacity(k.min(pool.len()));
    let mut seen_files: HashSet<&str> = HashSet::new();
    let mut taken: HashSet<ChunkKey> = HashSet::new();

    for candidate in pool {
        if selected.len() >= k {
            break;
        }
        if seen_files.insert(candidate.chunk.file_path.as_str()) {
            taken.insert(candidate.chunk.key());
            selected.push(candidate.clone());
        }
    }

    for candidate in pool {
        if selected.len() >= k {
            break;
        }
        if taken.insert(candidate.chunk.key()) {
            selected.push(candidate.clone());
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(path: &str, index: usize, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: StoredChunk {
                file_path: path.to_string(),
                chunk_index: index,
                content: String::new(),
                embedding: Vec::new(),
            },
            score,
        }
    }

    fn stored(path: &str, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk {
            file_path: path.to_string(),
            chunk_index: 0,
            content: String::new(),
            embedding,
        }
    }

    fn labels(chunks: &[ScoredChunk]) -> Vec<String> {
        chunks.iter().map(|c| format!("{}:{}", c.chunk.file_path, c.score)).collect()
    }

    #[test]
    fn test_similarity_boundaries() {
        let v = [0.3, -0.4, 1.2];
        let same = cosine_similarity(&v, &v).unwrap();
        assert!((same - 1.0).abs() < 1e-6);

        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]), Some(-1.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), None);
    }

    #[test]
    fn test_rank_excludes_unscorable_and_is_stable() {
        let query = [1.0, 0.0];
        let chunks = vec![
            stored("zero.py", vec![0.0, 0.0]),
            stored("first.py", vec![2.0, 0.0]),
            stored("wrong_dim.py", vec![1.0, 0.0, 0.0]),
            stored("second.py", vec![5.0, 0.0]),
            stored("side.py", vec![1.0, 1.0]),
        ];

        let ranked = rank_chunks(&query, chunks);
        let paths: Vec<_> = ranked.iter().map(|c| c.chunk.file_path.as_str()).collect();
        assert_eq!(paths, vec!["first.py", "second.py", "side.py"]);
    }

    #[test]
    fn test_diversify_prefers_distinct_files() {
        let pool = vec![
            scored("F1", 0, 0.9),
            scored("F1", 1, 0.85),
            scored("F2", 0, 0.8),
            scored("F3", 0, 0.7),
        ];

        let selected = diversify(&pool, 3);
        assert_eq!(labels(&selected), vec!["F1:0.9", "F2:0.8", "F3:0.7"]);
    }

    #[test]
    fn test_diversify_fills_from_repeated_files() {
        let pool = vec![
            scored("F1", 0, 0.9),
            scored("F1", 1, 0.85),
            scored("F2", 0, 0.8),
            scored("F1", 2, 0.6),
        ];

        let selected = diversify(&pool, 3);
        assert_eq!(labels(&selected), vec!["F1:0.9", "F2:0.8", "F1:0.85"]);
    }

    #[test]
    fn test_diversify_small_pool_and_zero_k() {
        let pool = vec![scored("F1", 0, 0.9), scored("F1", 1, 0.5)];

        assert_eq!(diversify(&pool, 5).len(), 2);
        assert!(diversify(&pool, 0).is_empty());
        assert!(diversify(&[], 3).is_empty());
    }
}
