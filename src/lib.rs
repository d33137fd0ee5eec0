pub mod collector;
pub mod commands;
pub mod dashboard;
pub mod errors;
pub mod export;
pub mod models;
pub mod numeric;
pub mod settings;
pub mod store;
pub mod view;

use crate::collector::HttpCollector;
use crate::commands::AppState;
use crate::dashboard::Dashboard;
use crate::settings::Settings;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn run() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_tracing(&settings.log_dir()).map_err(anyhow::Error::msg)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(serve(settings))
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let collector = HttpCollector::new(&settings.collector_base_url, settings.request_timeout())?;
    let state = AppState {
        dashboard: Dashboard::new(Arc::new(collector), settings.export_dir()),
    };
    tracing::info!(
        collector = %settings.collector_base_url,
        refresh_interval_secs = settings.refresh_interval_secs,
        "streamers tracking started"
    );

    let poller = tokio::spawn({
        let dashboard = state.dashboard.clone();
        let period = settings.refresh_interval();
        async move {
            let mut interval = refresh_interval(period);
            loop {
                interval.tick().await;
                if let Err(error) = dashboard.fetch_snapshot().await {
                    tracing::warn!(error = %error, "periodic snapshot fetch failed");
                }
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    poller.abort();
    tracing::info!("streamers tracking stopped");
    Ok(())
}

/// Ticker for the periodic re-fetch. The first tick fires immediately and
/// performs the initial fetch; a slow fetch pushes later ticks back instead of
/// firing a burst of catch-up fetches.
fn refresh_interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn init_tracing(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "streamers.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
