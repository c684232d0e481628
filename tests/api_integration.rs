use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde_json::{Value, json};
use std::sync::Arc;
use workout_dedup::config::AppConfig;
use workout_dedup::dedup::{
    domain::grammar::{GrammarFinding, Replacement},
    embedding::{Embedder, HashingEmbedder},
    grammar::GrammarChecker,
    decision::SearchParams,
    domain::workout::{MatchCandidate, WorkoutRecord},
    persistence::{CatalogStore, providers::memory::InMemoryCatalog},
    service::{DedupSettings, WorkoutService},
};
use workout_dedup::server::{build_router, build_state};

#[derive(Debug)]
struct StubGrammar;

#[async_trait]
impl GrammarChecker for StubGrammar {
    async fn check(&self, text: &str) -> Result<Vec<GrammarFinding>> {
        if !text.contains("Sqauts") {
            return Ok(Vec::new());
        }
        Ok(vec![GrammarFinding {
            message: "Possible spelling mistake found.".to_string(),
            short_message: "Spelling mistake".to_string(),
            sentence: text.to_string(),
            offset: 0,
            length: 6,
            replacements: vec![Replacement {
                value: "Squats".to_string(),
            }],
        }])
    }
}

#[derive(Debug)]
struct DownEmbedder;

#[async_trait]
impl Embedder for DownEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        bail!("connection refused (api key sk-secret)")
    }

    fn dimensions(&self) -> usize {
        16
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

/// Store whose connection is gone.
#[derive(Debug)]
struct UnreachableCatalog;

#[async_trait]
impl CatalogStore for UnreachableCatalog {
    async fn insert_workout(&self, _record: &WorkoutRecord) -> Result<()> {
        bail!("pool timed out connecting to postgres://admin:hunter2@db")
    }

    async fn search_similar(
        &self,
        _query_vec: &[f32],
        _params: SearchParams,
    ) -> Result<Vec<MatchCandidate>> {
        bail!("pool timed out connecting to postgres://admin:hunter2@db")
    }

    async fn list_workouts(&self) -> Result<Vec<WorkoutRecord>> {
        bail!("pool timed out connecting to postgres://admin:hunter2@db")
    }
}

fn test_config(extra: &[&str]) -> Arc<AppConfig> {
    let mut args = vec![
        "workout-dedup",
        "--persistence-provider",
        "memory",
        "--rate-limit-enabled",
        "false",
    ];
    args.extend_from_slice(extra);
    Arc::new(AppConfig::load_from_args(args).expect("test config"))
}

fn server_with(
    config: Arc<AppConfig>,
    embedder: Arc<dyn Embedder>,
    metrics: Option<PrometheusHandle>,
) -> TestServer {
    server_with_catalog(config, Arc::new(InMemoryCatalog::new()), embedder, metrics)
}

fn server_with_catalog(
    config: Arc<AppConfig>,
    catalog: Arc<dyn CatalogStore>,
    embedder: Arc<dyn Embedder>,
    metrics: Option<PrometheusHandle>,
) -> TestServer {
    let service = WorkoutService::new(
        catalog,
        embedder,
        Arc::new(StubGrammar),
        DedupSettings::from(&config.dedup),
    );
    let state = build_state(config, service, metrics);
    TestServer::new(build_router(state)).expect("test server")
}

fn test_server() -> TestServer {
    server_with(test_config(&[]), Arc::new(HashingEmbedder::default()), None)
}

fn squat_payload() -> Value {
    json!({
        "workoutName": "Barbell Back Squat",
        "description": "Compound lower body lift with a barbell on the upper back",
        "category": "Strength",
        "intensity": "High",
        "primaryMuscleGroup": { "quads": true, "glutes": true },
        "secondaryMuscleGroup": { "hamstrings": true }
    })
}

#[tokio::test]
async fn test_add_returns_saved_workout() {
    let server = test_server();

    let response = server.post("/workouts/add").json(&squat_payload()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Workout saved");
    assert_eq!(body["workout"]["name"], "Barbell Back Squat");
    assert_eq!(body["workout"]["intensity"], "High");
    assert_eq!(body["workout"]["visibility"], "Everyone");
    assert!(body["workout"]["id"].is_string());
}

#[tokio::test]
async fn test_add_without_name_is_bad_request() {
    let server = test_server();

    let response = server
        .post("/workouts/add")
        .json(&json!({ "description": "No name given" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Workout name is required.");
}

#[tokio::test]
async fn test_check_reports_duplicate_after_add() {
    let server = test_server();

    server
        .post("/workouts/add")
        .json(&squat_payload())
        .await
        .assert_status_ok();

    let response = server.post("/workouts/check").json(&squat_payload()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["isDuplicate"], true);
    assert_eq!(body["message"], "Possible duplicate workout found!");
    let matches = body["matches"].as_array().expect("matches array");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["name"], "Barbell Back Squat");
    assert!(matches[0]["similarity"].as_f64().unwrap() > 0.85);
    assert!(matches[0].get("embedding").is_none());
}

#[tokio::test]
async fn test_check_unique_omits_matches() {
    let server = test_server();

    let response = server
        .post("/workouts/check")
        .json(&json!({
            "name": "Morning Yoga Flow",
            "description": "Gentle stretching sequence",
            "category": "Flexibility",
            "intensity": "Very Low"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["isDuplicate"], false);
    assert_eq!(body["message"], "No duplicate found.");
    assert!(body.get("matches").is_none());
}

#[tokio::test]
async fn test_check_does_not_store() {
    let server = test_server();

    server
        .post("/workouts/check")
        .json(&squat_payload())
        .await
        .assert_status_ok();

    let listed: Value = server.get("/workouts").await.json();
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_list_returns_workouts_without_embeddings() {
    let server = test_server();

    server
        .post("/workouts/add")
        .json(&squat_payload())
        .await
        .assert_status_ok();

    let response = server.get("/workouts").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let workouts = body.as_array().expect("array");
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0]["primaryMuscleGroup"]["quads"], true);
    assert!(workouts[0].get("embedding").is_none());
}

#[tokio::test]
async fn test_lint_returns_findings() {
    let server = test_server();

    let response = server
        .post("/workouts/lint")
        .json(&json!({ "workoutName": "Sqauts", "description": "Deep and slow" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body[0]["message"], "Possible spelling mistake found.");
    assert_eq!(body[0]["replacements"][0]["value"], "Squats");
}

#[tokio::test]
async fn test_lint_blank_is_bad_request() {
    let server = test_server();

    let response = server
        .post("/workouts/lint")
        .json(&json!({ "name": "   ", "description": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Please enter a workout name or a description to check for typos."
    );
}

#[tokio::test]
async fn test_dependency_failure_hides_details() {
    let server = server_with(test_config(&[]), Arc::new(DownEmbedder), None);

    let response = server.post("/workouts/check").json(&squat_payload()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Failed to check for duplicates.");
    assert!(!response.text().contains("sk-secret"));

    let response = server.post("/workouts/add").json(&squat_payload()).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Failed to save workout.");
}

#[tokio::test]
async fn test_rate_limit_rejects_when_bucket_empty() {
    let mut config = (*test_config(&[])).clone();
    config.resilience.rate_limit_enabled = true;
    config.resilience.requests_per_second = 1;
    config.resilience.burst_size = 1;
    let server = server_with(
        Arc::new(config),
        Arc::new(HashingEmbedder::default()),
        None,
    );

    server.get("/workouts").await.assert_status_ok();
    server
        .get("/workouts")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = test_server();
    server
        .get("/metrics")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let handle = PrometheusBuilder::new().build_recorder().handle();
    let server = server_with(
        test_config(&[]),
        Arc::new(HashingEmbedder::default()),
        Some(handle),
    );
    server.get("/metrics").await.assert_status_ok();
}

#[tokio::test]
async fn test_catalog_failure_hides_details() {
    let server = server_with_catalog(
        test_config(&[]),
        Arc::new(UnreachableCatalog),
        Arc::new(HashingEmbedder::default()),
        None,
    );

    let response = server.post("/workouts/check").json(&squat_payload()).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Failed to check for duplicates.");
    assert!(!response.text().contains("hunter2"));

    let response = server.post("/workouts/add").json(&squat_payload()).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Failed to save workout.");
    assert!(!response.text().contains("hunter2"));

    let response = server.get("/workouts").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Failed to load workouts.");
}

#[tokio::test]
async fn test_unknown_intensity_is_bad_request_json() {
    let server = test_server();

    let mut payload = squat_payload();
    payload["intensity"] = json!("Extreme");
    let response = server.post("/workouts/check").json(&payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid request body.");
    assert!(!response.text().contains("unknown variant"));
}

#[tokio::test]
async fn test_mistyped_fields_are_bad_request_json() {
    let server = test_server();

    let response = server
        .post("/workouts/add")
        .json(&json!({ "name": "Lunges", "images": "not-a-list" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid request body.");

    let response = server
        .post("/workouts/lint")
        .json(&json!({ "name": 42 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid request body.");

    let listed: Value = server.get("/workouts").await.json();
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}
