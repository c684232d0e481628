//! Request pipeline: translate → normalize → embed → search → decide.
//!
//! Each operation runs its collaborator calls strictly in sequence. Only
//! translation failures are absorbed; every other collaborator failure
//! aborts the request as a [`ServiceError::Dependency`].

use crate::config::DedupConfig;
use crate::dedup::decision::{self, SearchParams};
use crate::dedup::domain::grammar::{GrammarFinding, LintRequest};
use crate::dedup::domain::workout::{DuplicateVerdict, WorkoutDraft, WorkoutRecord};
use crate::dedup::embedding::Embedder;
use crate::dedup::grammar::GrammarChecker;
use crate::dedup::normalizer::canonical_text;
use crate::dedup::persistence::CatalogStore;
use crate::dedup::translation::{Translator, translate_or_original};
use anyhow::anyhow;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Which collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    Search,
    Persistence,
    Grammar,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Embedding => "embedding",
            Self::Search => "similarity search",
            Self::Persistence => "persistence",
            Self::Grammar => "grammar check",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Caller supplied unusable input.
    #[error("{0}")]
    Validation(String),

    /// A collaborator failed; the request cannot complete.
    #[error("{stage} failed: {cause:#}")]
    Dependency { stage: Stage, cause: anyhow::Error },
}

impl ServiceError {
    fn dependency(stage: Stage) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| Self::Dependency { stage, cause }
    }
}

/// Tunables for the duplicate decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupSettings {
    pub similarity_threshold: f32,
    pub search: SearchParams,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: crate::dedup::defaults::SIMILARITY_THRESHOLD,
            search: SearchParams::default(),
        }
    }
}

impl From<&DedupConfig> for DedupSettings {
    fn from(config: &DedupConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            search: SearchParams {
                candidate_pool: config.candidate_pool_size,
                limit: config.result_limit,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkoutService {
    catalog: Arc<dyn CatalogStore>,
    embedder: Arc<dyn Embedder>,
    grammar: Arc<dyn GrammarChecker>,
    translator: Option<Arc<dyn Translator>>,
    translate_lint_input: bool,
    settings: DedupSettings,
}

impl WorkoutService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        embedder: Arc<dyn Embedder>,
        grammar: Arc<dyn GrammarChecker>,
        settings: DedupSettings,
    ) -> Self {
        Self {
            catalog,
            embedder,
            grammar,
            translator: None,
            translate_lint_input: false,
            settings,
        }
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Also translate lint input before it is checked.
    #[must_use]
    pub fn with_lint_translation(mut self, enabled: bool) -> Self {
        self.translate_lint_input = enabled;
        self
    }

    pub fn settings(&self) -> DedupSettings {
        self.settings
    }

    /// Translated copy of the free-text fields, used only as embedding input.
    async fn translated(&self, draft: &WorkoutDraft) -> WorkoutDraft {
        let translator = self.translator.as_deref();
        if translator.is_none() {
            return draft.clone();
        }

        WorkoutDraft {
            name: translate_or_original(translator, &draft.name).await,
            description: translate_or_original(translator, &draft.description).await,
            category: translate_or_original(translator, &draft.category).await,
            ..draft.clone()
        }
    }

    /// Canonical text embedding for a draft, identical for add and check.
    async fn embed_draft(&self, draft: &WorkoutDraft) -> Result<Vec<f32>, ServiceError> {
        let text = canonical_text(&self.translated(draft).await);
        debug!(text = %text, "Embedding canonical text");

        let started = Instant::now();
        let vector = self
            .embedder
            .embed(&text)
            .await
            .map_err(ServiceError::dependency(Stage::Embedding))?;
        metrics::histogram!("embedding_duration_seconds").record(started.elapsed().as_secs_f64());

        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(ServiceError::dependency(Stage::Embedding)(anyhow!(
                "{} returned {} dimensions, expected {}",
                self.embedder.name(),
                vector.len(),
                expected
            )));
        }
        // A zero vector has no direction; cosine scores against it are meaningless.
        if vector.iter().all(|x| *x == 0.0) {
            return Err(ServiceError::dependency(Stage::Embedding)(anyhow!(
                "{} returned an all-zero embedding",
                self.embedder.name()
            )));
        }

        Ok(vector)
    }

    /// Look for catalog entries similar to `draft`. Never writes.
    pub async fn check(&self, draft: &WorkoutDraft) -> Result<DuplicateVerdict, ServiceError> {
        let vector = self.embed_draft(draft).await?;

        let candidates = self
            .catalog
            .search_similar(&vector, self.settings.search)
            .await
            .map_err(ServiceError::dependency(Stage::Search))?;

        if let Some(best) = candidates.first() {
            debug!(
                best_match = %best.name,
                similarity = best.similarity,
                "Nearest catalog workout"
            );
        }

        let verdict = decision::decide(candidates, self.settings.similarity_threshold);

        metrics::counter!("workout_checks_total").increment(1);
        if verdict.is_duplicate {
            metrics::counter!("workout_duplicates_total").increment(1);
        }
        info!(
            name: "workout.check.completed",
            workout = %draft.name,
            is_duplicate = verdict.is_duplicate,
            matches = verdict.matches.len(),
            "Duplicate check completed"
        );

        Ok(verdict)
    }

    /// Insert a new catalog entry. Performs no duplicate check.
    pub async fn add(&self, draft: WorkoutDraft) -> Result<WorkoutRecord, ServiceError> {
        if draft.name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Workout name is required.".to_string(),
            ));
        }

        let vector = self.embed_draft(&draft).await?;
        let record = WorkoutRecord::from_draft(draft, vector);

        self.catalog
            .insert_workout(&record)
            .await
            .map_err(ServiceError::dependency(Stage::Persistence))?;

        metrics::counter!("workouts_added_total").increment(1);
        info!(
            name: "workout.added",
            id = %record.id,
            workout = %record.name,
            "Workout added to catalog"
        );

        Ok(record)
    }

    /// Forward free text to the grammar checker.
    pub async fn lint(&self, request: &LintRequest) -> Result<Vec<GrammarFinding>, ServiceError> {
        let Some(text) = request.combined_text() else {
            return Err(ServiceError::Validation(
                "Please enter a workout name or a description to check for typos.".to_string(),
            ));
        };

        let text = if self.translate_lint_input {
            translate_or_original(self.translator.as_deref(), &text).await
        } else {
            text
        };

        metrics::counter!("workout_lint_requests_total").increment(1);
        let findings = self
            .grammar
            .check(&text)
            .await
            .map_err(ServiceError::dependency(Stage::Grammar))?;

        debug!(findings = findings.len(), "Grammar check completed");
        Ok(findings)
    }

    /// Every stored workout, without embeddings.
    pub async fn list(&self) -> Result<Vec<WorkoutRecord>, ServiceError> {
        self.catalog
            .list_workouts()
            .await
            .map_err(ServiceError::dependency(Stage::Persistence))
    }
}
