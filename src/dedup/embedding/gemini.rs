//! Google Gemini embedding provider.
//!
//! Calls the Generative Language `embedContent` endpoint once per text.

use super::Embedder;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Embedding provider backed by the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiEmbeddingProvider {
    client: Client,
    api_key: String,
    base_url: Url,
    model: String,
}

impl GeminiEmbeddingProvider {
    pub fn new(api_key: String, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("Gemini embedding provider requires an API key");
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: Url::parse(base_url).context("Invalid Gemini base URL")?,
            model: model.strip_prefix("models/").unwrap_or(model).to_string(),
        })
    }

    fn endpoint(&self) -> Result<Url> {
        self.base_url
            .join(&format!("v1beta/models/{}:embedContent", self.model))
            .context("Invalid Gemini endpoint")
    }

    fn parse_response(body: &str) -> Result<Vec<f32>> {
        let response: EmbedContentResponse =
            serde_json::from_str(body).context("Failed to parse Gemini embedding response")?;
        Ok(response.embedding.values)
    }
}

#[async_trait]
impl Embedder for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: [Part { text }],
            },
        };

        let response = self
            .client
            .post(self.endpoint()?)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach Gemini embedding API: {}", e))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            bail!("Gemini embedding API returned {}: {}", status, body);
        }

        Self::parse_response(&body)
    }

    fn dimensions(&self) -> usize {
        match self.model.as_str() {
            "gemini-embedding-001" => 3072,
            _ => 768,
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
