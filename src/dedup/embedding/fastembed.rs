use super::Embedder;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use ::fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Local ONNX sentence embedding via fastembed.
///
/// The model stays inside its mutex for the whole process; inference runs
/// on the blocking pool with the lock held.
pub struct FastEmbedProvider {
    model: Arc<Mutex<Option<TextEmbedding>>>,
    kind: EmbeddingModel,
    dimensions: usize,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model", &self.kind)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl FastEmbedProvider {
    /// Create an uninitialized provider for the named model.
    ///
    /// Supported names: `all-minilm-l6-v2`, `bge-small-en-v1.5`, `bge-base-en-v1.5`.
    pub fn new(model_name: &str) -> Result<Self> {
        let (kind, dimensions) = Self::parse_model(model_name)?;
        Ok(Self {
            model: Arc::new(Mutex::new(None)),
            kind,
            dimensions,
        })
    }

    fn parse_model(name: &str) -> Result<(EmbeddingModel, usize)> {
        match name.to_lowercase().as_str() {
            "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
                Ok((EmbeddingModel::AllMiniLML6V2, 384))
            }
            "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => {
                Ok((EmbeddingModel::BGESmallENV15, 384))
            }
            "bge-base-en-v1.5" | "baai/bge-base-en-v1.5" => {
                Ok((EmbeddingModel::BGEBaseENV15, 768))
            }
            other => bail!("Unsupported fastembed model: {other}"),
        }
    }
}

/// A panic during inference poisons the lock but leaves the model usable.
fn lock_model<T>(slot: &Mutex<Option<T>>) -> MutexGuard<'_, Option<T>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Embedder for FastEmbedProvider {
    async fn initialize(&self) -> Result<()> {
        if lock_model(&self.model).is_some() {
            return Ok(());
        }

        info!(model = ?self.kind, "Initializing fastembed model...");
        let mut options = InitOptions::new(self.kind.clone());
        options.show_download_progress = false;

        let kind = self.kind.clone();
        let model = tokio::task::spawn_blocking(move || TextEmbedding::try_new(options))
            .await?
            .with_context(|| format!("Failed to load fastembed model {kind:?}"))?;
        *lock_model(&self.model) = Some(model);
        info!("Fastembed model ready");
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let slot = Arc::clone(&self.model);
        let input = vec![text.to_string()];

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut guard = lock_model(&slot);
            let Some(model) = guard.as_mut() else {
                bail!("FastEmbedProvider not initialized");
            };
            model.embed(input, None).map_err(|e| anyhow!(e))
        })
        .await
        .context("fastembed inference task failed")??;

        embeddings
            .into_iter()
            .next()
            .context("No embedding generated")
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &'static str {
        "fastembed"
    }
}
