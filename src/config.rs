//! Experiment configuration loaded from JSON

use crate::error::{Result, SolsweepError};
use crate::sweep::{HyperparameterGrid, SweepConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Everything needed to run a sweep from a descriptor file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Column holding the regression target (logS)
    pub target_column: String,

    /// Column holding row identifiers, if any
    pub id_column: Option<String>,

    /// Feature columns in order (None = every numeric non-target column)
    pub feature_columns: Option<Vec<String>>,

    /// Fraction of rows held out for testing
    pub test_fraction: f64,

    /// Seed for the train/test partition
    pub split_seed: u64,

    pub grid: HyperparameterGrid,

    pub sweep: SweepConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            target_column: "logS".to_string(),
            id_column: None,
            feature_columns: None,
            test_fraction: 0.2,
            split_seed: 42,
            grid: HyperparameterGrid::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Load and validate a configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| SolsweepError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        debug!(path = %path.display(), n_cells = config.grid.len(), "Loaded experiment config");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_column.is_empty() {
            return Err(SolsweepError::ConfigError("target_column must not be empty".to_string()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(SolsweepError::ConfigError(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if let Some(columns) = &self.feature_columns {
            if columns.iter().any(|c| c == &self.target_column) {
                return Err(SolsweepError::ConfigError(format!(
                    "target column '{}' is listed as a feature",
                    self.target_column
                )));
            }
        }
        if self.sweep.n_jobs == Some(0) {
            return Err(SolsweepError::ConfigError("n_jobs must be at least 1".to_string()));
        }
        self.grid.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::MaxDepth;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ExperimentConfig::default();
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.sweep.random_state, Some(42));
        assert_eq!(config.grid.len(), 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        write!(
            file,
            r#"{{
                "target_column": "measured_logS",
                "grid": {{ "tree_counts": [50, 100], "max_depths": [1, 3, "none"] }},
                "sweep": {{ "n_jobs": 2 }}
            }}"#
        )
        .unwrap();

        let config = ExperimentConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.target_column, "measured_logS");
        assert_eq!(config.grid.tree_counts, vec![50, 100]);
        assert_eq!(config.grid.max_depths[2], MaxDepth::Unbounded);
        assert_eq!(config.sweep.n_jobs, Some(2));
        assert_eq!(config.split_seed, 42);
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{ "grid": {{ "tree_counts": [0], "max_depths": [2] }} }}"#).unwrap();
        assert!(matches!(
            ExperimentConfig::from_json_file(file.path()),
            Err(SolsweepError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_bad_fraction() {
        let config = ExperimentConfig {
            test_fraction: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SolsweepError::ConfigError(_))));
    }
}
