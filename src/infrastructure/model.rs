//! Persisted gradient-boosted return model.
//!
//! Wraps the `gbdt` crate: the trainer fits and saves here, the server
//! loads once at startup and only ever predicts. The file format is
//! gbdt's own JSON serialization and is opaque to the rest of the crate.

use crate::application::dataset::TrainingExample;
use crate::domain::errors::ModelError;
use crate::domain::features::{to_model_input, FeatureVector, FEATURE_NAMES};
use crate::domain::ports::ReturnPredictor;
use gbdt::config::{Config, Loss};
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use std::path::Path;
use tracing::info;

/// Boosting hyperparameters. The defaults mirror the original fit and are
/// what the persisted production model was trained with.
#[derive(Debug, Clone, Copy)]
pub struct GbdtParams {
    pub iterations: usize,
    pub max_depth: u32,
    pub learning_rate: f32,
    pub data_sample_ratio: f64,
    pub feature_sample_ratio: f64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            iterations: 200,
            max_depth: 4,
            learning_rate: 0.05,
            data_sample_ratio: 0.8,
            feature_sample_ratio: 0.8,
        }
    }
}

pub struct GbdtReturnModel {
    model: GBDT,
}

impl GbdtReturnModel {
    /// Fits a squared-error boosted ensemble on the pooled examples.
    pub fn train(examples: &[TrainingExample], params: &GbdtParams) -> Result<Self, ModelError> {
        if examples.is_empty() {
            return Err(ModelError::Train("training set is empty".to_string()));
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(FEATURE_NAMES.len());
        cfg.set_max_depth(params.max_depth);
        cfg.set_iterations(params.iterations);
        cfg.set_shrinkage(params.learning_rate);
        cfg.set_data_sample_ratio(params.data_sample_ratio);
        cfg.set_feature_sample_ratio(params.feature_sample_ratio);
        cfg.loss = Loss::SquaredError;

        let mut data: DataVec = examples
            .iter()
            .map(|ex| {
                Data::new_training_data(to_model_input(&ex.features), 1.0, ex.label as f32, None)
            })
            .collect();

        info!(
            "Fitting GBDT: {} examples, {} iterations, depth {}, lr {}",
            examples.len(),
            params.iterations,
            params.max_depth,
            params.learning_rate
        );

        let mut model = GBDT::new(&cfg);
        model.fit(&mut data);
        Ok(Self { model })
    }

    /// Loads a previously saved model. Missing or unreadable files are an
    /// error; the server treats this as fatal at startup.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let model = GBDT::load_model(&path.display().to_string()).map_err(|e| {
            ModelError::Load {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { model })
    }

    /// Saves over any existing file at `path`; no backup, no versioning.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| ModelError::Save {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            }
        }
        self.model
            .save_model(&path.display().to_string())
            .map_err(|e| ModelError::Save {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Batch scoring, used by the trainer to summarize the fit.
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Vec<f64> {
        let data: DataVec = features
            .iter()
            .map(|fv| Data::new_test_data(to_model_input(fv), None))
            .collect();
        self.model.predict(&data).into_iter().map(f64::from).collect()
    }
}

impl ReturnPredictor for GbdtReturnModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let input: DataVec = vec![Data::new_test_data(to_model_input(features), None)];
        self.model
            .predict(&input)
            .first()
            .copied()
            .map(f64::from)
            .ok_or_else(|| ModelError::Predict("model returned no output".to_string()))
    }
}
