use crate::dedup::decision::SearchParams;
use crate::dedup::domain::workout::{MatchCandidate, WorkoutRecord};
use anyhow::Result;
use async_trait::async_trait;

pub mod providers;

/// Insert-only workout catalog with nearest-neighbour search.
#[async_trait]
pub trait CatalogStore: Send + Sync + std::fmt::Debug {
    /// Persist a new record, including its embedding.
    async fn insert_workout(&self, record: &WorkoutRecord) -> Result<()>;

    /// Most similar stored workouts, best first, at most `params.limit`.
    ///
    /// Scores are in [0, 1] (`(1 + cosine) / 2`).
    async fn search_similar(
        &self,
        query_vec: &[f32],
        params: SearchParams,
    ) -> Result<Vec<MatchCandidate>>;

    /// All stored workouts, oldest first, with embeddings left empty.
    async fn list_workouts(&self) -> Result<Vec<WorkoutRecord>>;
}
