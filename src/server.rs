use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use anyhow::{Context, bail};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::dedup::{
    self,
    embedding::EmbedderFactory,
    grammar::{GrammarChecker, LanguageToolChecker},
    persistence::{
        CatalogStore,
        providers::{memory::InMemoryCatalog, postgres::PostgresCatalog},
    },
    security::rate_limit::{AppRateLimiter, rate_limit_middleware},
    service::{DedupSettings, WorkoutService},
    translation::{GoogleTranslator, Translator},
};

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Construct every collaborator explicitly and assemble the service.
///
/// The embedder is initialized here; a failure aborts startup instead of
/// surfacing on the first request.
pub async fn build_service(config: &AppConfig) -> anyhow::Result<WorkoutService> {
    let embedder = EmbedderFactory::create(&config.embedding)?;
    embedder
        .initialize()
        .await
        .with_context(|| format!("Failed to initialize {} embedder", embedder.name()))?;
    info!(
        name: "embedding.ready",
        provider = embedder.name(),
        dimensions = embedder.dimensions(),
        "Embedding provider ready"
    );

    let catalog: Arc<dyn CatalogStore> = match config.persistence.provider.as_str() {
        "memory" => {
            tracing::warn!("Using in-memory catalog; workouts are lost on restart");
            Arc::new(InMemoryCatalog::new())
        }
        "postgres" => {
            let url = config
                .persistence
                .database_url
                .as_deref()
                .context("persistence.database_url is required for postgres")?;
            let provider = PostgresCatalog::new(
                url,
                config.persistence.max_connections,
                embedder.dimensions(),
            )
            .await
            .context("Failed to initialize Postgres catalog")?;
            Arc::new(provider)
        }
        other => bail!("Unknown persistence provider: {other}"),
    };

    let grammar: Arc<dyn GrammarChecker> = Arc::new(LanguageToolChecker::new(
        &config.grammar.base_url,
        config.grammar.language.clone(),
        Duration::from_secs(config.grammar.timeout_secs),
    )?);

    let mut service = WorkoutService::new(
        catalog,
        embedder,
        grammar,
        DedupSettings::from(&config.dedup),
    )
    .with_lint_translation(config.grammar.translate_input);

    if config.translation.enabled {
        let translator: Arc<dyn Translator> = match config.translation.provider.as_str() {
            "google" => {
                let api_key = config
                    .translation
                    .api_key
                    .clone()
                    .context("translation.api_key (or GOOGLE_API_KEY) is required")?;
                Arc::new(GoogleTranslator::new(
                    &config.translation.base_url,
                    api_key,
                    config.translation.target_language.clone(),
                    Duration::from_secs(config.translation.timeout_secs),
                )?)
            }
            other => bail!("Unknown translation provider: {other}"),
        };
        info!(
            provider = translator.name(),
            target = %config.translation.target_language,
            "Translation enabled"
        );
        service = service.with_translator(translator);
    }

    let settings = service.settings();
    info!(
        name: "dedup.config.loaded",
        threshold = settings.similarity_threshold,
        candidate_pool = settings.search.candidate_pool,
        limit = settings.search.limit,
        "Duplicate detection configured"
    );

    Ok(service)
}

/// Build the application state around an assembled service.
pub fn build_state(
    config: Arc<AppConfig>,
    service: WorkoutService,
    metrics: Option<PrometheusHandle>,
) -> AppState {
    let rate_limiter = Arc::new(AppRateLimiter::new(
        config.resilience.requests_per_second,
        config.resilience.burst_size,
    ));

    AppState {
        service: Arc::new(service),
        rate_limiter,
        config,
        metrics,
    }
}

/// Routes plus the middleware stack.
pub fn build_router(state: AppState) -> Router {
    let app = Router::new()
        .merge(dedup::api::router().with_state::<AppState>(Arc::clone(&state.service)))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Disabled timeouts still go through the layer, with an effectively infinite budget.
    let timeout_duration = if state.config.resilience.timeout_disabled {
        Duration::from_secs(365 * 24 * 60 * 60) // 1 year
    } else {
        Duration::from_secs(state.config.resilience.request_timeout_secs)
    };

    app.layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                        }
                    }
                }
            },
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

/// GET /metrics - Prometheus exposition
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(
    config: Arc<AppConfig>,
    metrics: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    let service = build_service(&config).await?;
    let state = build_state(Arc::clone(&config), service, metrics);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
