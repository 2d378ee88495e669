//! Builds labeled training examples out of feature rows.

use crate::domain::features::{FeatureRow, FeatureVector};

/// One supervised example: the indicators observed on day t, labeled with
/// the return realized from day t to t+1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: f64,
}

/// Pairs each feature row with the next row's return as its label.
///
/// The final row has no next-day return and is dropped, so the output is
/// always one shorter than the input (and empty for inputs of length < 2).
pub fn labeled_examples(rows: &[FeatureRow]) -> Vec<TrainingExample> {
    rows.windows(2)
        .map(|pair| TrainingExample {
            features: pair[0].features,
            label: pair[1].features.ret,
        })
        .collect()
}
