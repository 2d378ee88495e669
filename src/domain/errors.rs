use thiserror::Error;

/// Errors related to fetching market data
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream error for {symbol}: {message}")]
    Upstream { symbol: String, message: String },

    #[error("No data found for {symbol}")]
    NoData { symbol: String },

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },
}

/// Errors related to the persisted return model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to load model from {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Failed to save model to {path}: {reason}")]
    Save { path: String, reason: String },

    #[error("Training failed: {0}")]
    Train(String),

    #[error("Prediction failed: {0}")]
    Predict(String),
}
