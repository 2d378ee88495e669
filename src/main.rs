//! Stockcast API server.
//!
//! Loads the persisted return model once at startup and serves two
//! read-only endpoints:
//!
//! - `GET /historical?ticker=AAPL`
//! - `GET /predict?ticker=AAPL&days=30`
//!
//! # Environment Variables
//! - `BIND_ADDR` - Listen address (default: 127.0.0.1:8000)
//! - `MODEL_PATH` - Persisted model file (default: saved_models/next_return_gbdt.json)
//! - `YAHOO_BASE_URL` - Chart API base URL override

use anyhow::{Context, Result};
use std::sync::Arc;
use stockcast::config::Config;
use stockcast::infrastructure::model::GbdtReturnModel;
use stockcast::infrastructure::yahoo::YahooHistoryService;
use stockcast::interfaces::http::{build_router, AppState};
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Stockcast API {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: bind={}, model={}",
        config.bind_addr,
        config.model_path.display()
    );

    // The model is loaded exactly once and shared read-only for the
    // process lifetime; retraining happens in the separate train binary.
    let model = GbdtReturnModel::load(&config.model_path).with_context(|| {
        format!(
            "no usable model at {} (run the train binary first)",
            config.model_path.display()
        )
    })?;
    info!("Model loaded.");

    let state = AppState {
        history: Arc::new(YahooHistoryService::new(config.yahoo_base_url.clone())),
        model: Arc::new(model),
    };
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, router).await?;
    Ok(())
}
