//! Model traits

use crate::error::Result;
use crate::sweep::MaxDepth;
use ndarray::{Array1, Array2};

/// A regression model that can be fit and queried
pub trait Regressor: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Short model name used in logs and reports
    fn name(&self) -> &'static str;

    /// Get feature importances (if available)
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

/// Builds a fresh, unfitted tree ensemble for one grid cell
pub trait EnsembleTrainer: Send + Sync {
    type Model: Regressor;

    /// Configure a new model with `tree_count` trees, the given depth limit and seed
    fn configure(&self, tree_count: usize, max_depth: MaxDepth, seed: u64) -> Self::Model;
}
