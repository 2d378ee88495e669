//! Technical-indicator feature engineering.
//!
//! This is the one piece of logic shared verbatim between the offline
//! trainer and the serving process. Both call [`compute_features`]; any
//! divergence between the two call sites would be a correctness bug, so
//! there is deliberately only one implementation.
//!
//! All windows are trailing (no look-ahead). A row exists only once every
//! window is fully warmed up, so a series of length n yields n - 19 rows.

use crate::domain::market::PriceSeries;
use chrono::NaiveDate;
use statrs::statistics::{Data, Distribution};

const MA_SHORT_WINDOW: usize = 5;
const MA_LONG_WINDOW: usize = 20;
const VOLATILITY_WINDOW: usize = 10;
const MOMENTUM_LAG: usize = 5;

/// Trading days consumed before the first defined row (longest window is 20).
pub const WARMUP_DAYS: usize = MA_LONG_WINDOW - 1;

/// Model input ordering. This order is frozen: the persisted model was fit
/// against it, so any change here is a breaking change for saved models.
pub const FEATURE_NAMES: &[&str] = &["ma_5", "ma_20", "volatility", "momentum", "return"];

/// The 5 derived indicators for one trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// 5-day trailing mean of close over current close, minus 1.
    pub ma_5: f64,
    /// 20-day trailing mean of close over current close, minus 1.
    pub ma_20: f64,
    /// 10-day sample standard deviation of the daily return.
    pub volatility: f64,
    /// Close over the close 5 days earlier, minus 1.
    pub momentum: f64,
    /// 1-day fractional price change.
    pub ret: f64,
}

/// A defined feature row: the date and close it was derived at, plus the
/// indicators themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub features: FeatureVector,
}

/// Flattens a feature vector into the fixed model input ordering
/// ([`FEATURE_NAMES`]), cast to f32 at the model boundary.
pub fn to_model_input(features: &FeatureVector) -> Vec<f32> {
    vec![
        features.ma_5 as f32,
        features.ma_20 as f32,
        features.volatility as f32,
        features.momentum as f32,
        features.ret as f32,
    ]
}

/// Computes the full set of defined feature rows for a price series.
///
/// Series shorter than 20 points produce no rows at all. Output depends
/// only on the input series, so repeated invocations are bit-identical.
pub fn compute_features(series: &PriceSeries) -> Vec<FeatureRow> {
    let points = series.points();
    let n = points.len();
    if n < MA_LONG_WINDOW {
        return Vec::new();
    }

    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();

    // returns[i] is defined for i >= 1; index 0 is a placeholder that no
    // defined row ever reads (the warm-up skips past it).
    let mut returns = vec![0.0; n];
    for i in 1..n {
        returns[i] = closes[i] / closes[i - 1] - 1.0;
    }

    let mut rows = Vec::with_capacity(n - WARMUP_DAYS);
    for i in WARMUP_DAYS..n {
        let ma_5 = window_mean(&closes[i + 1 - MA_SHORT_WINDOW..=i]) / closes[i] - 1.0;
        let ma_20 = window_mean(&closes[i + 1 - MA_LONG_WINDOW..=i]) / closes[i] - 1.0;
        let volatility = window_std_dev(&returns[i + 1 - VOLATILITY_WINDOW..=i]);
        let momentum = closes[i] / closes[i - MOMENTUM_LAG] - 1.0;

        rows.push(FeatureRow {
            date: points[i].date,
            close: closes[i],
            features: FeatureVector {
                ma_5,
                ma_20,
                volatility,
                momentum,
                ret: returns[i],
            },
        });
    }
    rows
}

// f64 boundary for the statistical library; windows here are never empty,
// so the Option is only a formality.
fn window_mean(window: &[f64]) -> f64 {
    Data::new(window.to_vec()).mean().unwrap_or(0.0)
}

/// Sample standard deviation (n-1 denominator).
fn window_std_dev(window: &[f64]) -> f64 {
    Data::new(window.to_vec()).std_dev().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::PricePoint;
    use approx::assert_relative_eq;

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries::new("TEST", points).unwrap()
    }

    #[test]
    fn warmup_consumes_exactly_19_rows() {
        for n in [20usize, 21, 40, 300] {
            let closes: Vec<f64> = (1..=n).map(|i| 100.0 + (i as f64).sin()).collect();
            let rows = compute_features(&series_from_closes(&closes));
            assert_eq!(rows.len(), n - 19, "series length {n}");
        }
    }

    #[test]
    fn short_series_produces_no_rows() {
        let closes: Vec<f64> = (1..=19).map(|i| i as f64).collect();
        assert!(compute_features(&series_from_closes(&closes)).is_empty());
    }

    #[test]
    fn fields_match_closed_form_arithmetic() {
        // closes 1..=25: at index i the close is i+1 and the daily return
        // is (i+1)/i - 1 = 1/i, which keeps the expectations hand-checkable.
        let closes: Vec<f64> = (1..=25).map(|i| i as f64).collect();
        let rows = compute_features(&series_from_closes(&closes));
        assert_eq!(rows.len(), 6);

        let first = &rows[0]; // index 19, close 20
        assert_relative_eq!(first.close, 20.0);
        assert_relative_eq!(first.features.ret, 1.0 / 19.0, max_relative = 1e-12);
        // mean(16..=20) = 18
        assert_relative_eq!(first.features.ma_5, 18.0 / 20.0 - 1.0, max_relative = 1e-12);
        // mean(1..=20) = 10.5
        assert_relative_eq!(first.features.ma_20, 10.5 / 20.0 - 1.0, max_relative = 1e-12);
        assert_relative_eq!(first.features.momentum, 20.0 / 15.0 - 1.0, max_relative = 1e-12);

        // Sample std-dev (n-1 denominator) of the last 10 returns, written
        // out longhand as an independent check.
        let window: Vec<f64> = (10..=19).map(|i| 1.0 / i as f64).collect();
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let var = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / (window.len() - 1) as f64;
        assert_relative_eq!(first.features.volatility, var.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn deterministic_across_invocations() {
        let closes: Vec<f64> = (1..=60).map(|i| 50.0 + ((i * 7) % 13) as f64).collect();
        let series = series_from_closes(&closes);

        let a = compute_features(&series);
        let b = compute_features(&series);
        assert_eq!(a, b);
    }

    #[test]
    fn model_input_order_is_frozen() {
        let fv = FeatureVector {
            ma_5: 1.0,
            ma_20: 2.0,
            volatility: 3.0,
            momentum: 4.0,
            ret: 5.0,
        };
        assert_eq!(to_model_input(&fv), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(FEATURE_NAMES.len(), to_model_input(&fv).len());
    }
}
