use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// - `tracing-subscriber::fmt`, compact by default or JSON lines when `json_logs`.
/// - `EnvFilter` for dynamic log levels (RUST_LOG).
pub fn init(json_logs: bool) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,workout_dedup=debug"));

    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
    });
    let compact_layer = (!json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(json_layer)
        .with(compact_layer)
        .init();
}

/// How often histogram buffers are drained when nobody scrapes `/metrics`.
pub const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Install the global Prometheus recorder for `metrics` macros and start its
/// upkeep task. Must be called from within a Tokio runtime.
///
/// Returns `None` if a recorder is already installed.
pub fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            spawn_upkeep(handle.clone(), METRICS_UPKEEP_INTERVAL);
            Some(handle)
        }
        Err(e) => {
            tracing::warn!("Metrics recorder not installed: {e}");
            None
        }
    }
}

/// Periodically run recorder upkeep so histogram samples do not accumulate
/// between scrapes.
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            handle.run_upkeep();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_upkeep_task_keeps_running() {
        let handle = PrometheusBuilder::new().build_recorder().handle();

        let task = spawn_upkeep(handle.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(!task.is_finished());
        task.abort();
        handle.run_upkeep();
    }
}
