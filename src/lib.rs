//! solsweep - Hyperparameter sweeps for solubility regression
//!
//! This crate evaluates tree-ensemble regressors over a grid of hyperparameters
//! on precomputed molecular descriptors:
//! - Schema-checked datasets, seeded train/test splits
//! - Standard scaling fit on the training partition only
//! - Random forest and linear regression models
//! - Exhaustive, parallel grid sweeps with ordered results
//!
//! # Modules
//!
//! - [`data`] - Feature schemas, descriptor extraction, datasets and splits
//! - [`preprocessing`] - Feature scaling
//! - [`training`] - Regression trees, random forests, OLS, metrics, cross-validation
//! - [`sweep`] - Hyperparameter grids and the sweep evaluator
//! - [`config`] - JSON experiment configuration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data and models
pub mod data;
pub mod preprocessing;
pub mod training;

// Sweeps
pub mod sweep;
pub mod config;

// Services
pub mod cli;

pub use error::{Result, SolsweepError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, SolsweepError};

    // Data
    pub use crate::data::{
        train_test_split, Dataset, DescriptorTable, FeatureExtractor, FeatureSchema, FeatureVector, Split,
    };

    // Preprocessing
    pub use crate::preprocessing::{ScalingParameters, StandardScaler};

    // Training
    pub use crate::training::{
        cross_validate, mean_squared_error, r2_score, CrossValidator, CVStrategy, EnsembleTrainer,
        LinearRegression, MaxFeatures, RandomForestRegressor, RandomForestTrainer, Regressor,
    };

    // Sweeps
    pub use crate::config::ExperimentConfig;
    pub use crate::sweep::{HyperparameterGrid, MaxDepth, SweepConfig, SweepEvaluator, SweepResult, SweepTable};
}
