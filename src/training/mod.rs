//! Model training
//!
//! Provides the regression models used for solubility prediction:
//! - Regression trees and Random Forests
//! - Ordinary least squares (baseline)
//! - Regression metrics (MSE, R2)
//! - K-fold cross-validation

mod metrics;
mod models;
pub mod cross_validation;
pub mod decision_tree;
pub mod linear_models;
pub mod random_forest;

pub use cross_validation::{cross_validate, CVResults, CVSplit, CVStrategy, CrossValidator};
pub use decision_tree::{DecisionTreeRegressor, TreeNode};
pub use linear_models::LinearRegression;
pub use metrics::{mean_squared_error, r2_score, RegressionMetrics};
pub use models::{EnsembleTrainer, Regressor};
pub use random_forest::{MaxFeatures, RandomForestRegressor, RandomForestTrainer};
