//! Yahoo Finance chart-API client.
//!
//! Thin wrapper over the public v8 chart endpoint. One GET per call, no
//! caching, no retries, no explicit timeout; a slow upstream simply blocks
//! that request for its full duration.

use crate::domain::errors::MarketDataError;
use crate::domain::market::{HistoryRange, PricePoint, PriceSeries};
use crate::domain::ports::PriceHistoryService;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ===== Chart API response shape =====

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

// ===== Client =====

pub struct YahooHistoryService {
    client: Client,
    base_url: String,
}

impl YahooHistoryService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url: base_url.into() }
    }
}

impl Default for YahooHistoryService {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl PriceHistoryService for YahooHistoryService {
    async fn daily_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<PriceSeries, MarketDataError> {
        let url = format!(
            "{}/{}?range={}&interval=1d",
            self.base_url,
            symbol,
            range.as_str()
        );
        debug!("Fetching {} history for {}", range.as_str(), symbol);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketDataError::RequestFailed(e.to_string()))?;

        let payload: ChartResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::InvalidData {
                symbol: symbol.to_string(),
                reason: format!("unexpected chart payload: {e}"),
            })?;

        series_from_chart(symbol, payload)
    }
}

/// Converts the chart payload into a validated price series. Null close
/// entries (halted days, padding) are skipped; adjusted closes are
/// preferred when the endpoint provides them.
fn series_from_chart(
    symbol: &str,
    payload: ChartResponse,
) -> Result<PriceSeries, MarketDataError> {
    if let Some(err) = payload.chart.error {
        return Err(MarketDataError::Upstream {
            symbol: symbol.to_string(),
            message: format!("[{}] {}", err.code, err.description),
        });
    }

    let data = payload
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| MarketDataError::NoData { symbol: symbol.to_string() })?;

    let timestamps = data
        .timestamp
        .ok_or_else(|| MarketDataError::NoData { symbol: symbol.to_string() })?;

    let closes = match data.indicators.adjclose.as_ref().and_then(|a| a.first()) {
        Some(adj) => &adj.adjclose,
        None => {
            &data
                .indicators
                .quote
                .first()
                .ok_or_else(|| MarketDataError::NoData { symbol: symbol.to_string() })?
                .close
        }
    };

    let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let Some(close) = close else { continue };
        let Some(dt) = DateTime::from_timestamp(*ts, 0) else { continue };
        let date = dt.date_naive();

        // The in-progress session can repeat the last date; keep the first.
        if points.last().is_some_and(|p: &PricePoint| p.date >= date) {
            continue;
        }
        points.push(PricePoint { date, close: *close });
    }

    if points.is_empty() {
        return Err(MarketDataError::NoData { symbol: symbol.to_string() });
    }

    PriceSeries::new(symbol, points)
}
