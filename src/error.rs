//! Error types for solsweep

use crate::sweep::MaxDepth;
use thiserror::Error;

/// Result type alias for solsweep operations
pub type Result<T> = std::result::Result<T, SolsweepError>;

/// Main error type for the solsweep crate
#[derive(Error, Debug)]
pub enum SolsweepError {
    /// A tree count or depth limit is zero, or a hyperparameter list is empty
    #[error("Invalid hyperparameter: {name} = {value}, {reason}")]
    InvalidHyperparameter {
        name: String,
        value: String,
        reason: String,
    },

    /// Train and test partitions do not share the same feature schema
    #[error("Schema mismatch: train has {train:?}, test has {test:?}")]
    SchemaMismatch { train: Vec<String>, test: Vec<String> },

    /// A partition has zero rows
    #[error("Empty dataset: {0} partition has no rows")]
    EmptyDataset(String),

    /// A single grid cell failed to fit or predict; the whole sweep is aborted
    #[error("Fit failure at tree_count = {tree_count}, max_depth = {max_depth}: {reason}")]
    FitFailure {
        tree_count: usize,
        max_depth: MaxDepth,
        reason: String,
    },

    #[error("Parse error for '{identifier}': {reason}")]
    ParseError { identifier: String, reason: String },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl SolsweepError {
    /// Wrap a model-level error as the failure of one sweep cell
    pub fn at_cell(self, tree_count: usize, max_depth: MaxDepth) -> Self {
        match self {
            err @ SolsweepError::FitFailure { .. } => err,
            other => SolsweepError::FitFailure {
                tree_count,
                max_depth,
                reason: other.to_string(),
            },
        }
    }
}

impl From<polars::error::PolarsError> for SolsweepError {
    fn from(err: polars::error::PolarsError) -> Self {
        SolsweepError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for SolsweepError {
    fn from(err: serde_json::Error) -> Self {
        SolsweepError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SolsweepError {
    fn from(err: ndarray::ShapeError) -> Self {
        SolsweepError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolsweepError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SolsweepError = io_err.into();
        assert!(matches!(err, SolsweepError::IoError(_)));
    }

    #[test]
    fn test_at_cell_wraps_model_errors() {
        let err = SolsweepError::ComputationError("NaN prediction".to_string())
            .at_cell(50, MaxDepth::Limited(3));
        match err {
            SolsweepError::FitFailure { tree_count, max_depth, reason } => {
                assert_eq!(tree_count, 50);
                assert_eq!(max_depth, MaxDepth::Limited(3));
                assert!(reason.contains("NaN prediction"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fit_failure_display_unbounded() {
        let err = SolsweepError::ModelNotFitted.at_cell(10, MaxDepth::Unbounded);
        assert_eq!(
            err.to_string(),
            "Fit failure at tree_count = 10, max_depth = unbounded: Model not fitted"
        );
    }
}
