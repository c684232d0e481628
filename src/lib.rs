//! Workout duplicate checker
//!
//! An HTTP service that tells a coach whether a workout they are about to
//! submit already exists in a shared catalog, using text-embedding
//! similarity rather than exact string matching.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server with rate limiting, timeouts and tracing
//! - **Pipeline**: translate → normalize → embed → vector search → threshold decision
//! - **Collaborators**: fastembed / Gemini embeddings, Google translation, LanguageTool
//! - **Catalog**: Postgres + pgvector (HNSW), or an in-memory store for development
//!
//! # Modules
//!
//! - [`config`]: layered configuration (defaults, file, environment, CLI)
//! - [`dedup`]: domain, pipeline, collaborators and HTTP routes
//! - [`server`]: startup wiring and middleware stack

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod dedup;
pub mod server;

use crate::config::AppConfig;
use dedup::security::rate_limit::AppRateLimiter;
use dedup::service::WorkoutService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Duplicate detection pipeline.
    pub service: Arc<WorkoutService>,
    /// Global Rate Limiter
    pub rate_limiter: Arc<AppRateLimiter>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
    /// Prometheus exporter handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.service)
            .field("rate_limiter", &self.rate_limiter)
            .field("metrics_enabled", &self.metrics.is_some())
            .finish()
    }
}
