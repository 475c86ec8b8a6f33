//! Matchday Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use matchday_aggregator::api::{create_router, AppState};
use matchday_aggregator::export::CsvExporter;
use matchday_aggregator::metrics::Metrics;
use matchday_aggregator::service::{Aggregator, MAX_LOOKAHEAD_DAYS};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matchday_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = matchday_aggregator::config::load_default()?;
    tracing::info!(leagues = cfg.leagues.len(), "configuration loaded");

    // CSV snapshots are opt-in; the in-memory pipeline never needs them.
    let exporter = std::env::var("MATCHDAY_EXPORT_DIR")
        .ok()
        .map(|dir| Arc::new(CsvExporter::new(dir)));

    let state = AppState {
        aggregator: Arc::new(Aggregator::from_config(&cfg)),
        exporter,
    };

    let metrics = Metrics::init(MAX_LOOKAHEAD_DAYS);
    let router = create_router(state).merge(metrics.router());

    let addr = std::env::var("MATCHDAY_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
