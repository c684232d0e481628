//! Factory for creating embedders based on configuration.

use super::{Embedder, FastEmbedProvider, GeminiEmbeddingProvider, HashingEmbedder};
use crate::config::EmbeddingConfig;
use crate::dedup::defaults;
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
pub struct EmbedderFactory;

impl EmbedderFactory {
    /// Create an (uninitialized) embedder for `config.provider`.
    ///
    /// Providers:
    /// - `fastembed`: local model, `model` defaults to `all-minilm-l6-v2`
    /// - `gemini`: requires `api_key`, `model` defaults to `embedding-001`
    /// - `hashing`: offline feature hashing, `dimensions` defaults to 256
    pub fn create(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
        match config.provider.as_str() {
            "fastembed" => {
                let model = config.model.as_deref().unwrap_or(defaults::FASTEMBED_MODEL);
                tracing::info!("Using fastembed embeddings ({model})");
                Ok(Arc::new(FastEmbedProvider::new(model)?))
            }
            "gemini" => {
                let api_key = config
                    .api_key
                    .clone()
                    .context("embedding.api_key (or GOOGLE_API_KEY) is required for gemini")?;
                let model = config.model.as_deref().unwrap_or(defaults::GEMINI_MODEL);
                let base_url = config
                    .base_url
                    .as_deref()
                    .unwrap_or(defaults::GEMINI_BASE_URL);
                tracing::info!("Using Gemini embeddings ({model})");
                Ok(Arc::new(GeminiEmbeddingProvider::new(
                    api_key,
                    base_url,
                    model,
                    Duration::from_secs(config.timeout_secs),
                )?))
            }
            "hashing" => {
                let dimensions = config
                    .dimensions
                    .unwrap_or(super::hashing::DEFAULT_DIMENSIONS);
                tracing::warn!("Using hashing embeddings ({dimensions} dims); not for production");
                Ok(Arc::new(HashingEmbedder::new(dimensions)))
            }
            other => bail!("Unknown embedding provider: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: provider.to_string(),
            model: None,
            api_key: None,
            base_url: None,
            dimensions: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_creates_known_providers() {
        assert_eq!(EmbedderFactory::create(&config("hashing")).unwrap().name(), "hashing");
        let fast = EmbedderFactory::create(&config("fastembed")).unwrap();
        assert_eq!(fast.name(), "fastembed");
        assert_eq!(fast.dimensions(), 384);
    }

    #[test]
    fn test_gemini_requires_key() {
        assert!(EmbedderFactory::create(&config("gemini")).is_err());

        let mut cfg = config("gemini");
        cfg.api_key = Some("key".into());
        assert_eq!(EmbedderFactory::create(&cfg).unwrap().dimensions(), 768);
    }

    #[test]
    fn test_unknown_provider() {
        assert!(EmbedderFactory::create(&config("word2vec")).is_err());
    }
}
