//! Standard (z-score) feature scaling

use crate::data::{Dataset, Split};
use crate::error::{Result, SolsweepError};
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-feature centering and scaling learned from a training partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    feature_names: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl ScalingParameters {
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Population standard deviations; constant columns are stored as 1.0
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Apply `(x - mean) / std` to every column of `dataset`. Parameters are never refit.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        if dataset.schema().names() != self.feature_names.as_slice() {
            return Err(SolsweepError::SchemaMismatch {
                train: self.feature_names.clone(),
                test: dataset.schema().names().to_vec(),
            });
        }

        let means = Array1::from_vec(self.means.clone());
        let stds = Array1::from_vec(self.stds.clone());
        let scaled = (dataset.features() - &means) / &stds;
        dataset.with_features(scaled)
    }

    /// Undo the scaling
    pub fn invert(&self, dataset: &Dataset) -> Result<Dataset> {
        if dataset.schema().names() != self.feature_names.as_slice() {
            return Err(SolsweepError::SchemaMismatch {
                train: self.feature_names.clone(),
                test: dataset.schema().names().to_vec(),
            });
        }

        let means = Array1::from_vec(self.means.clone());
        let stds = Array1::from_vec(self.stds.clone());
        let unscaled = dataset.features() * &stds + &means;
        dataset.with_features(unscaled)
    }
}

/// Fits [`ScalingParameters`] on training data only
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Learn per-column mean and population standard deviation
    pub fn fit(train: &Dataset) -> Result<ScalingParameters> {
        if train.is_empty() {
            return Err(SolsweepError::EmptyDataset("train".to_string()));
        }

        let x = train.features();
        let means = x
            .mean_axis(Axis(0))
            .ok_or_else(|| SolsweepError::EmptyDataset("train".to_string()))?;
        let stds = x.std_axis(Axis(0), 0.0);

        let params = ScalingParameters {
            feature_names: train.schema().names().to_vec(),
            means: means.to_vec(),
            stds: stds
                .iter()
                .map(|&s| if s == 0.0 || !s.is_finite() { 1.0 } else { s })
                .collect(),
        };
        debug!(n_features = params.means.len(), n_rows = train.n_rows(), "Fitted standard scaler");
        Ok(params)
    }

    /// Fit on `train` and return the parameters with the scaled training set
    pub fn fit_apply(train: &Dataset) -> Result<(ScalingParameters, Dataset)> {
        let params = Self::fit(train)?;
        let scaled = params.apply(train)?;
        Ok((params, scaled))
    }

    /// Fit on the split's training partition and apply the same parameters to both partitions
    pub fn scale_split(split: &Split) -> Result<(ScalingParameters, Split)> {
        let (params, train) = Self::fit_apply(split.train())?;
        let test = params.apply(split.test())?;
        Ok((params, Split::new(train, test)))
    }
}
