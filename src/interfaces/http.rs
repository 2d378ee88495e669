//! HTTP surface: two read-only endpoints.
//!
//! Upstream-data failures deliberately come back as HTTP 200 with an
//! `{"error": ...}` body rather than an error status; existing callers
//! inspect the payload, not the status code. Out-of-range input is the
//! exception: it is rejected at the boundary with a 400 before any fetch
//! or model work happens.

use crate::application::forecast::{
    self, ForecastPoint, MAX_HORIZON_DAYS, MIN_HORIZON_DAYS,
};
use crate::domain::errors::MarketDataError;
use crate::domain::features::compute_features;
use crate::domain::market::HistoryRange;
use crate::domain::ports::{PriceHistoryService, ReturnPredictor};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

/// Most recent trading days returned by `/historical` (about 6 months).
const HISTORY_TAIL_DAYS: usize = 120;

pub struct AppState {
    pub history: Arc<dyn PriceHistoryService>,
    pub model: Arc<dyn ReturnPredictor>,
}

pub fn build_router(state: AppState) -> Router {
    // Open CORS: the endpoints are read-only and consumed from browser
    // frontends on other origins.
    Router::new()
        .route("/historical", get(historical))
        .route("/predict", get(predict))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ===== Payloads =====

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct PricePayload {
    date: String,
    close: f64,
}

#[derive(Debug, Serialize)]
struct HistoricalPayload {
    ticker: String,
    prices: Vec<PricePayload>,
}

#[derive(Debug, Serialize)]
struct ForecastPointPayload {
    day: u32,
    date: String,
    predicted_price: f64,
}

#[derive(Debug, Serialize)]
struct PredictPayload {
    ticker: String,
    last_known_price: f64,
    last_known_date: String,
    days: u32,
    forecast: Vec<ForecastPointPayload>,
}

fn ymd(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Always-200 error contract for upstream data failures.
fn fetch_error(err: MarketDataError) -> Response {
    warn!("Fetch failed: {}", err);
    Json(ErrorBody { error: err.to_string() }).into_response()
}

// ===== /historical =====

#[derive(Debug, Deserialize)]
pub struct HistoricalQuery {
    ticker: String,
}

async fn historical(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoricalQuery>,
) -> Response {
    let series = match state
        .history
        .daily_history(&query.ticker, HistoryRange::OneYear)
        .await
    {
        Ok(series) => series,
        Err(err) => return fetch_error(err),
    };

    let prices = series
        .tail(HISTORY_TAIL_DAYS)
        .iter()
        .map(|p| PricePayload { date: ymd(p.date), close: p.close })
        .collect();

    Json(HistoricalPayload {
        ticker: query.ticker.to_uppercase(),
        prices,
    })
    .into_response()
}

// ===== /predict =====

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    ticker: String,
    #[serde(default = "default_days")]
    days: i64,
}

fn default_days() -> i64 {
    MAX_HORIZON_DAYS as i64
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PredictQuery>,
) -> Response {
    if query.days < MIN_HORIZON_DAYS as i64 || query.days > MAX_HORIZON_DAYS as i64 {
        let body = ErrorBody {
            error: format!(
                "days must be between {MIN_HORIZON_DAYS} and {MAX_HORIZON_DAYS}, got {}",
                query.days
            ),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }
    let days = query.days as u32;

    let series = match state
        .history
        .daily_history(&query.ticker, HistoryRange::OneYear)
        .await
    {
        Ok(series) => series,
        Err(err) => return fetch_error(err),
    };

    let rows = compute_features(&series);
    let Some(seed) = rows.last() else {
        // Not enough history to warm up the windows. The fetch itself
        // succeeded, so this is a computational failure, not a data one.
        let body = ErrorBody {
            error: format!(
                "{}: series too short for feature computation",
                query.ticker.to_uppercase()
            ),
        };
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    };

    let points = match forecast::project(state.model.as_ref(), seed, days) {
        Ok(points) => points,
        Err(err) => {
            let body = ErrorBody { error: err.to_string() };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    Json(PredictPayload {
        ticker: query.ticker.to_uppercase(),
        last_known_price: forecast::round2(seed.close),
        last_known_date: ymd(seed.date),
        days,
        forecast: points.iter().map(point_payload).collect(),
    })
    .into_response()
}

fn point_payload(p: &ForecastPoint) -> ForecastPointPayload {
    ForecastPointPayload {
        day: p.day,
        date: ymd(p.date),
        predicted_price: p.predicted_price,
    }
}
