use super::error::ApiError;
use super::extract::ApiJson;
use crate::dedup::{
    defaults,
    domain::{
        grammar::{GrammarFinding, LintRequest},
        workout::{MatchCandidate, WorkoutDraft, WorkoutRecord},
    },
    service::WorkoutService,
};
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;

pub fn build_router() -> Router<Arc<WorkoutService>> {
    Router::new()
        .route("/workouts", get(list_workouts))
        .route("/workouts/add", post(add_workout))
        .route("/workouts/check", post(check_workout))
        .route("/workouts/lint", post(lint_workout))
}

#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub message: &'static str,
    pub workout: WorkoutRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub is_duplicate: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchCandidate>>,
}

/// POST /workouts/add - Embed and store a workout
async fn add_workout(
    State(service): State<Arc<WorkoutService>>,
    ApiJson(draft): ApiJson<WorkoutDraft>,
) -> Result<Json<AddResponse>, ApiError> {
    let workout = service
        .add(draft)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to save workout."))?;

    Ok(Json(AddResponse {
        message: defaults::ADD_MESSAGE,
        workout,
    }))
}

/// POST /workouts/check - Report similar catalog workouts
async fn check_workout(
    State(service): State<Arc<WorkoutService>>,
    ApiJson(draft): ApiJson<WorkoutDraft>,
) -> Result<Json<CheckResponse>, ApiError> {
    let verdict = service
        .check(&draft)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to check for duplicates."))?;

    let response = if verdict.is_duplicate {
        CheckResponse {
            is_duplicate: true,
            message: defaults::CHECK_DUPLICATE_MESSAGE,
            matches: Some(verdict.matches),
        }
    } else {
        CheckResponse {
            is_duplicate: false,
            message: defaults::CHECK_UNIQUE_MESSAGE,
            matches: None,
        }
    };
    Ok(Json(response))
}

/// POST /workouts/lint - Grammar findings for name/description
async fn lint_workout(
    State(service): State<Arc<WorkoutService>>,
    ApiJson(request): ApiJson<LintRequest>,
) -> Result<Json<Vec<GrammarFinding>>, ApiError> {
    let findings = service
        .lint(&request)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to check for issues."))?;
    Ok(Json(findings))
}

/// GET /workouts - All stored workouts without embeddings
async fn list_workouts(
    State(service): State<Arc<WorkoutService>>,
) -> Result<Json<Vec<WorkoutRecord>>, ApiError> {
    let workouts = service
        .list()
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to load workouts."))?;
    Ok(Json(workouts))
}
