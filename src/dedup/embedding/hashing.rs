//! Deterministic offline embedder.
//!
//! Hashes lowercase word tokens into a fixed number of buckets and
//! L2-normalizes the counts. Texts sharing vocabulary land close together,
//! which is enough for development and tests without a model download.
//!
//! Buckets come from SeaHash, whose output is fixed by its specification, so
//! vectors stored by one build still match queries from the next.

use super::Embedder;
use anyhow::Result;
use async_trait::async_trait;

pub const DEFAULT_DIMENSIONS: usize = 256;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        (seahash::hash(token.as_bytes()) % self.dimensions as u64) as usize
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.bucket(&token.to_lowercase())] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_text_same_vector() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed_sync("Jumping Jacks. Full body warm-up.");
        let b = embedder.embed_sync("jumping jacks full BODY warm up");
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_DIMENSIONS);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let v = HashingEmbedder::new(64).embed_sync("Bench press with a pause at the chest");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_buckets_follow_seahash() {
        let embedder = HashingEmbedder::new(97);
        for token in ["squat", "deadlift", "burpees"] {
            let expected = (seahash::hash(token.as_bytes()) % 97) as usize;
            assert_eq!(embedder.bucket(token), expected);
        }

        let v = embedder.embed_sync("Squat");
        let hot = (seahash::hash(b"squat") % 97) as usize;
        assert!((v[hot] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(8).embed_sync(" ... ");
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
