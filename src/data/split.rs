//! Seeded train/test partitioning

use super::dataset::Dataset;
use crate::error::{Result, SolsweepError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Disjoint train and test partitions of one dataset
#[derive(Debug, Clone)]
pub struct Split {
    train: Dataset,
    test: Dataset,
}

impl Split {
    /// Pair two partitions that were produced elsewhere
    pub fn new(train: Dataset, test: Dataset) -> Self {
        Self { train, test }
    }

    pub fn train(&self) -> &Dataset {
        &self.train
    }

    pub fn test(&self) -> &Dataset {
        &self.test
    }

    pub fn into_parts(self) -> (Dataset, Dataset) {
        (self.train, self.test)
    }
}

/// Shuffle rows with a seeded RNG and hold out `ceil(n * test_fraction)` of them for testing.
///
/// Both partitions are guaranteed to be non-empty.
pub fn train_test_split(dataset: &Dataset, test_fraction: f64, seed: u64) -> Result<Split> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SolsweepError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let n_samples = dataset.n_rows();
    let n_test = (n_samples as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(SolsweepError::ValidationError(format!(
            "cannot split {} rows with test_fraction {} into two non-empty partitions",
            n_samples, test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    debug!(n_train = train_idx.len(), n_test = test_idx.len(), seed, "Split dataset");

    Ok(Split {
        train: dataset.select(train_idx),
        test: dataset.select(test_idx),
    })
}
