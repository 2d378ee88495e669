// Training-set construction
pub mod dataset;

// Iterative multi-day forecaster
pub mod forecast;
