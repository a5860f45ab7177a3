//! Cross-validation

use super::metrics::RegressionMetrics;
use super::models::Regressor;
use crate::data::Dataset;
use crate::error::{Result, SolsweepError};
use crate::preprocessing::StandardScaler;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cross-validation strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CVStrategy {
    /// K-Fold cross-validation
    KFold { n_splits: usize, shuffle: bool },
    /// K-Fold repeated with a different shuffle each time
    RepeatedKFold { n_splits: usize, n_repeats: usize },
}

impl Default for CVStrategy {
    fn default() -> Self {
        CVStrategy::KFold { n_splits: 5, shuffle: true }
    }
}

/// A single train/test split
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Cross-validation splitter
#[derive(Debug, Clone)]
pub struct CrossValidator {
    strategy: CVStrategy,
    random_state: Option<u64>,
}

impl CrossValidator {
    /// Create a new cross-validator
    pub fn new(strategy: CVStrategy) -> Self {
        Self {
            strategy,
            random_state: None,
        }
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Generate train/test splits
    pub fn split(&self, n_samples: usize) -> Result<Vec<CVSplit>> {
        match self.strategy {
            CVStrategy::KFold { n_splits, shuffle } => {
                self.k_fold_split(n_samples, n_splits, shuffle, self.random_state)
            }
            CVStrategy::RepeatedKFold { n_splits, n_repeats } => {
                let mut all_splits = Vec::with_capacity(n_splits * n_repeats);
                for repeat in 0..n_repeats {
                    let seed = self.random_state.map(|s| s.wrapping_add(repeat as u64));
                    let mut splits = self.k_fold_split(n_samples, n_splits, true, seed)?;
                    for split in &mut splits {
                        split.fold_idx += repeat * n_splits;
                    }
                    all_splits.extend(splits);
                }
                Ok(all_splits)
            }
        }
    }

    fn k_fold_split(
        &self,
        n_samples: usize,
        n_splits: usize,
        shuffle: bool,
        seed: Option<u64>,
    ) -> Result<Vec<CVSplit>> {
        if n_splits < 2 {
            return Err(SolsweepError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < n_splits {
            return Err(SolsweepError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if shuffle {
            let mut rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;
        let mut splits = Vec::with_capacity(n_splits);
        let mut current = 0;

        for fold_idx in 0..n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices = indices[current..current + fold_size].to_vec();
            let train_indices = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(CVSplit {
                train_indices,
                test_indices,
                fold_idx,
            });
            current += fold_size;
        }

        Ok(splits)
    }
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Per-fold test metrics
    pub folds: Vec<RegressionMetrics>,
    pub mean_r2: f64,
    pub std_r2: f64,
    pub mean_mse: f64,
    pub std_mse: f64,
}

fn mean_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

impl CVResults {
    /// Aggregate per-fold metrics
    pub fn from_folds(folds: Vec<RegressionMetrics>) -> Self {
        let (mean_r2, std_r2) = mean_std(folds.iter().map(|m| m.r2));
        let (mean_mse, std_mse) = mean_std(folds.iter().map(|m| m.mse));
        Self {
            folds,
            mean_r2,
            std_r2,
            mean_mse,
            std_mse,
        }
    }

    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }
}

/// Score a freshly built model on every fold.
///
/// The scaler is refit on each fold's training rows so the held-out fold never
/// influences the scaling.
pub fn cross_validate<M, F>(make_model: F, dataset: &Dataset, cv: &CrossValidator) -> Result<CVResults>
where
    M: Regressor,
    F: Fn() -> M,
{
    let splits = cv.split(dataset.n_rows())?;
    let mut folds = Vec::with_capacity(splits.len());

    for split in &splits {
        let (params, train) = StandardScaler::fit_apply(&dataset.select(&split.train_indices))?;
        let test = params.apply(&dataset.select(&split.test_indices))?;

        let mut model = make_model();
        model.fit(train.features(), train.targets())?;
        let predictions = model.predict(test.features())?;
        let metrics = RegressionMetrics::compute(test.targets(), &predictions)?;

        debug!(
            model = model.name(),
            fold = split.fold_idx,
            r2 = metrics.r2,
            mse = metrics.mse,
            "Scored fold"
        );
        folds.push(metrics);
    }

    Ok(CVResults::from_folds(folds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureSchema;
    use crate::training::LinearRegression;
    use ndarray::{Array1, Array2};

    #[test]
    fn test_k_fold() {
        let cv = CrossValidator::new(CVStrategy::KFold { n_splits: 5, shuffle: false });
        let splits = cv.split(100).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);
        }

        // All indices should be covered exactly once in test sets
        let mut all_test: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        all_test.sort();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_uneven_folds() {
        let cv = CrossValidator::new(CVStrategy::KFold { n_splits: 3, shuffle: true }).with_random_state(3);
        let sizes: Vec<usize> = cv.split(10).unwrap().iter().map(|s| s.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_repeated_k_fold() {
        let cv = CrossValidator::new(CVStrategy::RepeatedKFold { n_splits: 5, n_repeats: 3 })
            .with_random_state(42);
        let splits = cv.split(100).unwrap();

        assert_eq!(splits.len(), 15);
        assert_eq!(splits.last().unwrap().fold_idx, 14);
    }

    #[test]
    fn test_invalid_splits() {
        assert!(CrossValidator::new(CVStrategy::KFold { n_splits: 1, shuffle: false }).split(10).is_err());
        assert!(CrossValidator::new(CVStrategy::KFold { n_splits: 5, shuffle: false }).split(3).is_err());
    }

    #[test]
    fn test_cross_validate_linear() {
        let n = 30;
        let schema = FeatureSchema::new(["a", "b"]).unwrap();
        let features = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { i as f64 } else { ((i * 7) % 5) as f64 });
        let targets = Array1::from_shape_fn(n, |i| 0.5 * features[[i, 0]] - features[[i, 1]] + 2.0);
        let ids = (0..n).map(|i| i.to_string()).collect();
        let ds = Dataset::new(schema, features, targets, ids).unwrap();

        let cv = CrossValidator::new(CVStrategy::KFold { n_splits: 5, shuffle: true }).with_random_state(0);
        let results = cross_validate(LinearRegression::new, &ds, &cv).unwrap();

        assert_eq!(results.n_folds(), 5);
        assert!(results.mean_r2 > 0.999, "mean r2 = {}", results.mean_r2);
        assert!(results.mean_mse < 1e-8);
    }

    #[test]
    fn test_cross_validate_linear_with_constant_column() {
        let n = 30;
        let schema = FeatureSchema::new(["MolWt", "AromaticProportion"]).unwrap();
        let features = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { i as f64 } else { 0.0 });
        let targets = features.column(0).mapv(|v| 0.5 * v + 1.0);
        let ids = (0..n).map(|i| i.to_string()).collect();
        let ds = Dataset::new(schema, features, targets, ids).unwrap();

        let cv = CrossValidator::new(CVStrategy::KFold { n_splits: 5, shuffle: true }).with_random_state(0);
        let results = cross_validate(LinearRegression::new, &ds, &cv).unwrap();

        assert_eq!(results.n_folds(), 5);
        assert!(results.mean_r2 > 0.999, "mean r2 = {}", results.mean_r2);
    }
}
