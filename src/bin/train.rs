//! Offline trainer.
//!
//! Fetches multi-year daily history for a fixed ticker list, builds one
//! pooled feature/label dataset, fits the boosted return model and saves
//! it to the well-known path the server loads from. Overwrites any
//! existing model file; there is no versioning.
//!
//! # Usage
//! ```sh
//! cargo run --bin train
//! cargo run --bin train -- --output saved_models/experiment.json --iterations 50
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use stockcast::application::dataset::{labeled_examples, TrainingExample};
use stockcast::config::DEFAULT_MODEL_PATH;
use stockcast::domain::features::compute_features;
use stockcast::domain::market::HistoryRange;
use stockcast::domain::ports::PriceHistoryService;
use stockcast::infrastructure::model::{GbdtParams, GbdtReturnModel};
use stockcast::infrastructure::yahoo::YahooHistoryService;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Fixed training universe for the pooled dataset.
const TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA", "META", "JPM", "WMT", "NFLX",
];

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the next-day return model", long_about = None)]
struct Args {
    /// Path to output model file
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Number of boosting iterations (trees)
    #[arg(long, default_value_t = 200)]
    iterations: usize,

    /// Maximum depth of each tree
    #[arg(long, default_value_t = 4)]
    max_depth: u32,

    /// Learning rate (shrinkage)
    #[arg(long, default_value_t = 0.05)]
    learning_rate: f32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let args = Args::parse();
    let source = YahooHistoryService::default();

    let mut examples: Vec<TrainingExample> = Vec::new();
    for ticker in TICKERS {
        // A ticker with no usable data simply contributes nothing.
        let Ok(series) = source.daily_history(ticker, HistoryRange::FiveYears).await else {
            continue;
        };
        let rows = compute_features(&series);
        examples.extend(labeled_examples(&rows));
    }

    if examples.is_empty() {
        bail!("no training data: every ticker fetch came back empty");
    }
    info!("Training samples: {}", examples.len());

    let params = GbdtParams {
        iterations: args.iterations,
        max_depth: args.max_depth,
        learning_rate: args.learning_rate,
        ..GbdtParams::default()
    };
    let model = GbdtReturnModel::train(&examples, &params)?;

    // Quick sanity read on the fitted model before persisting it.
    let inputs: Vec<_> = examples.iter().map(|ex| ex.features).collect();
    let preds = model.predict_batch(&inputs);
    let n = preds.len() as f64;
    let mean = preds.iter().sum::<f64>() / n;
    let min = preds.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = preds.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    info!(
        "In-sample predicted return: mean {:+.5}, min {:+.5}, max {:+.5}",
        mean, min, max
    );

    model.save(&args.output)?;
    info!("Model saved: {}", args.output.display());
    Ok(())
}
