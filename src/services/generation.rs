//! Text generation services: prompt -> answer text

use crate::config::{GenerationBackend, GenerationConfig};
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

/// Text generation service
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the generator selected by the configuration
pub fn generator_from_config(config: &GenerationConfig, timeout: Duration) -> Result<Box<dyn Generator>> {
    match config.backend {
        GenerationBackend::OpenAi => {
            let api_key = super::openai_api_key()?;
            Ok(Box::new(OpenAiGenerator::new(
                config.base_url(),
                &config.model,
                &api_key,
                config.max_tokens,
                timeout,
            )?))
        }
        GenerationBackend::Ollama => Ok(Box::new(OllamaGenerator::new(
            config.base_url(),
            &config.model,
            config.max_tokens,
            timeout,
        )?)),
    }
}

/// OpenAI-compatible `/chat/completions`
pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ChatRespChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResp {
    choices: Vec<ChatRespChoice>,
}

impl OpenAiGenerator {
    pub fn new(base_url: &str, model: &str, api_key: &str, max_tokens: usize, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            max_tokens,
        })
    }
}

impl Generator for OpenAiGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "max_tokens": self.max_tokens,
        });
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;
        if !resp.status().is_success() {
            let status = resp.status();
            let txt = resp.text().unwrap_or_default();
            return Err(Error::Generation(format!("OpenAI error {}: {}", status, txt)));
        }
        let parsed: ChatResp = resp.json()?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Generation("response carried no message content".into()))
    }
}

/// Ollama `/api/chat`, non-streaming
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: usize,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str, max_tokens: usize, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_tokens,
        })
    }
}

impl Generator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "stream": false,
            "options": { "num_predict": self.max_tokens as i64 }
        });
        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()?;
        if !resp.status().is_success() {
            let status = resp.status();
            let txt = resp.text().unwrap_or_default();
            return Err(Error::Generation(format!("Ollama error {}: {}", status, txt)));
        }
        let json: serde_json::Value = resp.json()?;
        json["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Generation("response carried no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_openai_generator_returns_content_verbatim() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 800
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  It uses Flask.\n"}}]}"#)
            .create();

        let generator = OpenAiGenerator::new(&server.url(), "gpt-4o", "sk-test", 800, TIMEOUT).unwrap();
        assert_eq!(generator.generate("What framework?").unwrap(), "  It uses Flask.\n");
        mock.assert();
    }

    #[test]
    fn test_openai_generator_missing_content_is_an_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create();

        let generator = OpenAiGenerator::new(&server.url(), "gpt-4o", "k", 800, TIMEOUT).unwrap();
        assert!(matches!(generator.generate("q"), Err(Error::Generation(_))));
    }

    #[test]
    fn test_ollama_generator() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({ "stream": false })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"llama3","message":{"role":"assistant","content":"Answer"},"done":true}"#)
            .create();

        let generator = OllamaGenerator::new(&server.url(), "llama3", 800, TIMEOUT).unwrap();
        assert_eq!(generator.generate("q").unwrap(), "Answer");
    }

    #[test]
    fn test_ollama_generator_error_status() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body(r#"{"error": "model not found"}"#)
            .create();

        let generator = OllamaGenerator::new(&server.url(), "missing", 800, TIMEOUT).unwrap();
        let err = generator.generate("q").unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }
}
