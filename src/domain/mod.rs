// Domain-specific error types
pub mod errors;

// Feature engineering (shared between training and serving)
pub mod features;

// Price series types
pub mod market;

// Port interfaces
pub mod ports;
