use crate::domain::errors::{MarketDataError, ModelError};
use crate::domain::features::FeatureVector;
use crate::domain::market::{HistoryRange, PriceSeries};
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait PriceHistoryService: Send + Sync {
    /// Daily close history for one symbol over the given lookback range.
    async fn daily_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<PriceSeries, MarketDataError>;
}

/// A fitted, stateless mapping from one feature vector to a predicted
/// next-period return. Never mutated after load, so it is shared freely
/// across requests without locking.
pub trait ReturnPredictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}
