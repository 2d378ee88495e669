//! Price series types shared by the trainer and the API server.

use crate::domain::errors::MarketDataError;
use chrono::NaiveDate;

/// One daily observation: trading date and closing price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Lookback window understood by the history source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    OneYear,
    FiveYears,
}

impl HistoryRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::OneYear => "1y",
            HistoryRange::FiveYears => "5y",
        }
    }
}

/// Daily close series for one symbol, strictly ascending by date.
///
/// The ordering invariant is enforced at construction so downstream
/// rolling-window code never has to re-check it.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(
        symbol: impl Into<String>,
        points: Vec<PricePoint>,
    ) -> Result<Self, MarketDataError> {
        let symbol = symbol.into();
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(MarketDataError::InvalidData {
                    symbol,
                    reason: format!(
                        "dates out of order: {} followed by {}",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }
        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Most recent `n` points, in ascending date order.
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}
