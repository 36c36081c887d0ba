//! Embedding services: text -> vector
//!
//! Every implementation returns one vector per input text, in input order.

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::{Error, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

/// Text embedding service
pub trait Embedder {
    /// Embed a batch of texts, one vector per text
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::Embedding("empty embedding response".into()))
    }
}

/// Build the embedder selected by the configuration
pub fn embedder_from_config(config: &EmbeddingConfig, timeout: Duration) -> Result<Box<dyn Embedder>> {
    match config.backend {
        EmbeddingBackend::OpenAi => {
            let api_key = super::openai_api_key()?;
            Ok(Box::new(OpenAiEmbedder::new(
                config.base_url(),
                &config.model,
                &api_key,
                config.batch_size,
                timeout,
            )?))
        }
        EmbeddingBackend::Ollama => Ok(Box::new(OllamaEmbedder::new(config.base_url(), &config.model, timeout)?)),
        EmbeddingBackend::Local => Ok(Box::new(FastEmbedder::new()?)),
    }
}

/// OpenAI-compatible `/embeddings` endpoint
pub struct OpenAiEmbedder {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    batch_size: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingItem {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(base_url: &str, model: &str, api_key: &str, batch_size: usize, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            batch_size: batch_size.max(1),
        })
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let resp = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": texts,
            }))
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(Error::Embedding(format!("OpenAI embeddings failed ({}): {}", status, body)));
        }

        let parsed: OpenAiEmbeddingResponse = resp.json()?;
        if parsed.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Mismatch embedding count: got {}, expected {}",
                parsed.data.len(),
                texts.len()
            )));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!("Embedding batch of {} texts", batch.len());
            embeddings.extend(self.embed_batch(batch)?);
        }
        Ok(embeddings)
    }
}

/// Ollama `/api/embeddings`, one request per text
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let resp = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": text,
            }))
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(Error::Embedding(format!("Ollama embeddings failed ({}): {}", status, body)));
        }

        let json: serde_json::Value = resp.json()?;
        json["embedding"]
            .as_array()
            .ok_or_else(|| Error::Embedding("No embedding field in Ollama response".into()))?
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| Error::Embedding(format!("Non-numeric embedding value in Ollama response: {}", v)))
            })
            .collect()
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed_text(text)).collect()
    }
}

/// Local transformer model (all-MiniLM-L6-v2), no network after the first download
pub struct FastEmbedder {
    model: TextEmbedding,
}

impl FastEmbedder {
    /// Load the default model
    pub fn new() -> Result<Self> {
        let mut options = InitOptions::default();
        options.model_name = EmbeddingModel::AllMiniLML6V2;
        options.show_download_progress = true;

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Embedding(format!("Failed to load embedding model: {}", e)))?;

        Ok(Self { model })
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| Error::Embedding(format!("Embedding generation failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_openai_embedder_splits_batches_in_order() {
        let mut server = mockito::Server::new();
        let first = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({ "input": ["a", "b"] })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[1.0,0.0]},{"embedding":[0.0,1.0]}]}"#)
            .create();
        let second = server
            .mock("POST", "/embeddings")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({ "input": ["c"] })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.5,0.5]}]}"#)
            .create();

        let embedder = OpenAiEmbedder::new(&server.url(), "text-embedding-3-large", "sk-test", 2, TIMEOUT).unwrap();
        let texts: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let vectors = embedder.embed(&texts).unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
        first.assert();
        second.assert();
    }

    #[test]
    fn test_openai_embedder_rejects_count_mismatch() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[1.0]}]}"#)
            .create();

        let embedder = OpenAiEmbedder::new(&server.url(), "m", "k", 32, TIMEOUT).unwrap();
        let err = embedder.embed(&["x".to_string(), "y".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[test]
    fn test_openai_embedder_reports_http_status() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/embeddings")
            .with_status(429)
            .with_body("rate limited")
            .create();

        let embedder = OpenAiEmbedder::new(&server.url(), "m", "k", 32, TIMEOUT).unwrap();
        let err = embedder.embed_one("hello").unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_ollama_embedder_one_request_per_text() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embedding":[0.25,0.75]}"#)
            .expect(2)
            .create();

        let embedder = OllamaEmbedder::new(&server.url(), "nomic-embed-text", TIMEOUT).unwrap();
        let vectors = embedder.embed(&["a".to_string(), "b".to_string()]).unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![0.25, 0.75]);
        mock.assert();
    }

    #[test]
    fn test_ollama_embedder_rejects_non_numeric_values() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embedding":[0.25,"oops",0.75]}"#)
            .create();

        let embedder = OllamaEmbedder::new(&server.url(), "nomic-embed-text", TIMEOUT).unwrap();
        let err = embedder.embed_one("a").unwrap_err();

        assert!(matches!(err, Error::Embedding(_)));
    }
}
