//! Embedding client for similarity lookups.
//!
//! Talks to an OpenAI-compatible `/v1/embeddings` endpoint. Behind a
//! trait so the store can be exercised without network access.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{Result, RtlgenError};

/// Default embeddings endpoint.
const EMBEDDINGS_API_URL: &str = "https://api.openai.com/v1/embeddings";

/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Text-to-vector capability.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Client for an OpenAI-compatible embeddings API.
pub struct OpenAiEmbeddings {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAiEmbeddings {
    /// Create a client reading OPENAI_API_KEY from the environment.
    pub fn new() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| RtlgenError::Embedding("OPENAI_API_KEY not set".to_string()))?;
        Ok(Self::with_api_key(api_key, DEFAULT_EMBEDDING_MODEL))
    }

    /// Create a client with an explicit key and model.
    pub fn with_api_key(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            url: EMBEDDINGS_API_URL.to_string(),
            model: model.into(),
        }
    }

    /// Model this client embeds with.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "input": text }))
            .send()
            .await
            .map_err(|e| RtlgenError::Embedding(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RtlgenError::Embedding(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RtlgenError::Embedding(format!("Failed to parse response: {}", e)))?;

        parse_embedding(&body)
    }
}

/// Pull the embedding vector out of an API response body.
fn parse_embedding(body: &Value) -> Result<Vec<f32>> {
    body["data"][0]["embedding"]
        .as_array()
        .map(|values| {
            values
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect()
        })
        .ok_or_else(|| RtlgenError::Embedding("response carried no embedding".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embedding() {
        let body = json!({
            "data": [ { "embedding": [0.25, -0.5, 1.0] } ],
            "model": "text-embedding-3-small"
        });

        let embedding = parse_embedding(&body).unwrap();
        assert_eq!(embedding, vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn test_parse_embedding_missing_data() {
        let body = json!({ "error": { "message": "bad request" } });
        assert!(matches!(
            parse_embedding(&body),
            Err(RtlgenError::Embedding(_))
        ));
    }

    #[test]
    fn test_with_api_key_sets_model() {
        let client = OpenAiEmbeddings::with_api_key("key".to_string(), "custom-model");
        assert_eq!(client.model(), "custom-model");
    }
}
