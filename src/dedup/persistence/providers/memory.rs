//! Process-local catalog.
//!
//! Scores every stored vector exactly, so the candidate pool size has no
//! effect here; only the result limit applies. Contents are lost on restart.

use crate::dedup::decision::SearchParams;
use crate::dedup::domain::workout::{MatchCandidate, WorkoutRecord};
use crate::dedup::persistence::CatalogStore;
use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: RwLock<Vec<WorkoutRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Map cosine similarity from [-1, 1] onto [0, 1].
pub(crate) fn similarity_score(cosine: f32) -> f32 {
    ((1.0 + cosine) / 2.0).clamp(0.0, 1.0)
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn insert_workout(&self, record: &WorkoutRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn search_similar(
        &self,
        query_vec: &[f32],
        params: SearchParams,
    ) -> Result<Vec<MatchCandidate>> {
        let records = self.records.read().await;

        let mut matches = Vec::with_capacity(records.len());
        for record in records.iter() {
            if record.embedding.len() != query_vec.len() {
                bail!(
                    "Embedding dimension mismatch: stored {} vs query {}",
                    record.embedding.len(),
                    query_vec.len()
                );
            }
            let score = similarity_score(cosine_similarity(query_vec, &record.embedding));
            matches.push(record.to_candidate(score));
        }

        // Stable sort keeps insertion order among equal scores.
        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(params.limit);

        Ok(matches)
    }

    async fn list_workouts(&self) -> Result<Vec<WorkoutRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|r| WorkoutRecord {
                embedding: Vec::new(),
                ..r.clone()
            })
            .collect())
    }
}
