//! Workout duplicate checker server
//!
//! Entry point: load configuration, initialize telemetry, serve.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

use workout_dedup::config::AppConfig;
use workout_dedup::dedup::telemetry;
use workout_dedup::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    telemetry::init(config.telemetry.json_logs);

    let metrics = if config.telemetry.metrics_enabled {
        telemetry::install_metrics()
    } else {
        None
    };

    info!(
        persistence = %config.persistence.provider,
        embedding = %config.embedding.provider,
        translation = config.translation.enabled,
        "Configuration loaded"
    );

    server::start_server(Arc::new(config), metrics).await
}
