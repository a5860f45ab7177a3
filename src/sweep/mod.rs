//! Hyperparameter sweeps over tree-ensemble regressors
//!
//! A sweep fits one ensemble for every (tree_count, max_depth) pair in a
//! [`HyperparameterGrid`], scores each on a held-out partition and returns a
//! [`SweepTable`] in row-major grid order.

mod config;
mod evaluator;
mod grid;
mod table;

pub use config::SweepConfig;
pub use evaluator::SweepEvaluator;
pub use grid::{GridCell, HyperparameterGrid, MaxDepth};
pub use table::{SweepResult, SweepTable};
