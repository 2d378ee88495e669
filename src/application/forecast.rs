//! Iterative multi-day price projection.
//!
//! The model only predicts one day ahead, so longer horizons are produced
//! by feeding each predicted return back into the feature vector and
//! predicting again. Only `return` and `momentum` are updated between
//! iterations; `ma_5`, `ma_20` and `volatility` stay frozen at the seed's
//! values for the whole horizon, since no real price data exists to
//! recompute them from. That drift is a known property of this forecaster
//! and is kept intact.

use crate::domain::errors::ModelError;
use crate::domain::features::FeatureRow;
use crate::domain::ports::ReturnPredictor;
use chrono::NaiveDate;

/// Raw model output is empirically too muted; it is scaled up by this
/// fixed factor before being applied. Empirical tuning constant, kept
/// verbatim.
pub const RETURN_AMPLIFIER: f64 = 3.0;

/// Cap on any single day's implied move, applied after amplification.
/// Keeps one extreme raw prediction from compounding away.
pub const DAILY_MOVE_CAP: f64 = 0.05;

/// Allowed forecast horizon, inclusive.
pub const MIN_HORIZON_DAYS: u32 = 1;
pub const MAX_HORIZON_DAYS: u32 = 30;

// Momentum feed-forward blend weights. Empirical tuning constants, kept
// verbatim; note they do not sum to 1.
const MOMENTUM_CARRY: f64 = 0.6;
const MOMENTUM_IMPULSE: f64 = 0.8;

/// One projected day: 1-based offset, calendar date, absolute price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub day: u32,
    pub date: NaiveDate,
    pub predicted_price: f64,
}

/// Rounds a price to cents for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Projects `days` prices forward from the seed row.
///
/// Forecast dates step in calendar days from the seed's date; weekends and
/// holidays are not skipped. The caller is responsible for validating
/// `days` against [`MIN_HORIZON_DAYS`]/[`MAX_HORIZON_DAYS`] before any
/// model work happens.
pub fn project(
    model: &dyn ReturnPredictor,
    seed: &FeatureRow,
    days: u32,
) -> Result<Vec<ForecastPoint>, ModelError> {
    let mut x = seed.features;
    let mut price = seed.close;
    let mut points = Vec::with_capacity(days as usize);

    for day in 1..=days {
        let raw = model.predict(&x)?;
        let r = (raw * RETURN_AMPLIFIER).clamp(-DAILY_MOVE_CAP, DAILY_MOVE_CAP);

        price *= 1.0 + r;
        points.push(ForecastPoint {
            day,
            date: seed.date + chrono::Duration::days(day as i64),
            predicted_price: round2(price),
        });

        x.ret = r;
        x.momentum = x.momentum * MOMENTUM_CARRY + r * MOMENTUM_IMPULSE;
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::FeatureVector;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::sync::Mutex;

    struct FixedPredictor(f64);

    impl ReturnPredictor for FixedPredictor {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    /// Records every feature vector the model is asked to score.
    struct RecordingPredictor {
        raw: f64,
        seen: Mutex<Vec<FeatureVector>>,
    }

    impl RecordingPredictor {
        fn new(raw: f64) -> Self {
            Self { raw, seen: Mutex::new(Vec::new()) }
        }
    }

    impl ReturnPredictor for RecordingPredictor {
        fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
            self.seen.lock().unwrap().push(*features);
            Ok(self.raw)
        }
    }

    fn seed() -> FeatureRow {
        FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            close: 100.0,
            features: FeatureVector {
                ma_5: -0.01,
                ma_20: 0.02,
                volatility: 0.015,
                momentum: 0.04,
                ret: 0.003,
            },
        }
    }

    #[test]
    fn horizon_length_matches_request() {
        let model = FixedPredictor(0.001);
        for days in [MIN_HORIZON_DAYS, 7, MAX_HORIZON_DAYS] {
            let points = project(&model, &seed(), days).unwrap();
            assert_eq!(points.len(), days as usize);
            assert_eq!(points[0].day, 1);
            assert_eq!(points.last().unwrap().day, days);
        }
    }

    #[test]
    fn dates_step_in_calendar_days() {
        let model = FixedPredictor(0.0);
        let points = project(&model, &seed(), 5).unwrap();
        // 2024-01-10 + 5 calendar days, weekends included.
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(points[4].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn extreme_predictions_are_capped_at_five_percent() {
        let model = FixedPredictor(10.0);
        let points = project(&model, &seed(), 3).unwrap();
        assert_relative_eq!(points[0].predicted_price, 105.0);
        assert_relative_eq!(points[1].predicted_price, 110.25);
        assert_relative_eq!(points[2].predicted_price, round2(100.0 * 1.05f64.powi(3)));

        let model = FixedPredictor(-10.0);
        let points = project(&model, &seed(), 2).unwrap();
        assert_relative_eq!(points[0].predicted_price, 95.0);
        assert_relative_eq!(points[1].predicted_price, 90.25);
    }

    #[test]
    fn amplifier_is_applied_before_the_cap() {
        // Raw 0.01 amplifies to 0.03, inside the cap.
        let model = FixedPredictor(0.01);
        let points = project(&model, &seed(), 1).unwrap();
        assert_relative_eq!(points[0].predicted_price, 103.0);
    }

    #[test]
    fn feed_forward_updates_return_and_momentum_only() {
        let model = RecordingPredictor::new(0.01);
        project(&model, &seed(), 3).unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], seed().features);

        let applied = 0.01 * RETURN_AMPLIFIER;
        let expected_momentum = seed().features.momentum * 0.6 + applied * 0.8;
        assert_relative_eq!(seen[1].ret, applied, max_relative = 1e-12);
        assert_relative_eq!(seen[1].momentum, expected_momentum, max_relative = 1e-12);

        // Everything else stays frozen at the seed across the horizon.
        for x in seen.iter() {
            assert_eq!(x.ma_5, seed().features.ma_5);
            assert_eq!(x.ma_20, seed().features.ma_20);
            assert_eq!(x.volatility, seed().features.volatility);
        }
    }

    proptest! {
        #[test]
        fn applied_return_never_exceeds_the_cap(raw in -1_000.0f64..1_000.0, days in 1u32..=30) {
            let model = RecordingPredictor::new(raw);
            let points = project(&model, &seed(), days).unwrap();

            // Fed-back `return` fields are exactly the applied returns.
            let seen = model.seen.lock().unwrap();
            for x in seen.iter().skip(1) {
                prop_assert!(x.ret >= -DAILY_MOVE_CAP && x.ret <= DAILY_MOVE_CAP);
            }

            // Price path ratios respect the cap too (rounded to cents, so
            // allow a whisker of rounding slack).
            let mut prev = seed().close;
            for p in &points {
                let ratio = p.predicted_price / prev;
                prop_assert!(ratio >= 1.0 - DAILY_MOVE_CAP - 1e-3);
                prop_assert!(ratio <= 1.0 + DAILY_MOVE_CAP + 1e-3);
                prev = p.predicted_price;
            }
        }
    }
}
