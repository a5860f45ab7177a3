//! Sweep configuration

use crate::training::MaxFeatures;
use serde::{Deserialize, Serialize};

/// Configuration for a hyperparameter sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Seed given to every cell's forest (None = fresh entropy per cell)
    pub random_state: Option<u64>,

    /// Number of worker threads (None = rayon default, Some(1) = sequential)
    pub n_jobs: Option<usize>,

    /// Minimum samples to split a node
    pub min_samples_split: usize,

    /// Minimum samples per leaf
    pub min_samples_leaf: usize,

    /// Features considered per split
    pub max_features: MaxFeatures,

    /// Bootstrap rows for each tree
    pub bootstrap: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            random_state: Some(42),
            n_jobs: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
        }
    }
}

impl SweepConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Draw a fresh seed for every cell
    pub fn without_random_state(mut self) -> Self {
        self.random_state = None;
        self
    }

    /// Set the worker pool size
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }
}
