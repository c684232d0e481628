//! Text embedding collaborators.
//!
//! Every provider is constructed explicitly and must be initialized before
//! first use; nothing loads models lazily on the request path.

pub mod factory;
pub mod fastembed;
pub mod gemini;
pub mod hashing;

use anyhow::Result;
use async_trait::async_trait;

pub use factory::EmbedderFactory;
pub use self::fastembed::FastEmbedProvider;
pub use gemini::GeminiEmbeddingProvider;
pub use hashing::HashingEmbedder;

/// Maps text to a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Load models or verify credentials. Called once at startup.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// Short provider identifier for logs.
    fn name(&self) -> &'static str;
}
