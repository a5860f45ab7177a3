//! Typed solubility datasets

use super::features::{FeatureExtractor, FeatureSchema, FeatureVector};
use crate::error::{Result, SolsweepError};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use tracing::{debug, warn};

/// A labeled dataset: one feature row, one finite target and one identifier per sample.
///
/// The schema is checked once here, so downstream code can index columns freely.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: FeatureSchema,
    features: Array2<f64>,
    targets: Array1<f64>,
    identifiers: Vec<String>,
}

/// A record dropped while building a dataset from identifiers
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    pub identifier: String,
    pub reason: String,
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
    )
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| SolsweepError::DataError(format!("column '{}' not found", name)))?;
    if !is_numeric(column.dtype()) {
        return Err(SolsweepError::DataError(format!(
            "column '{}' has non-numeric type {}",
            name,
            column.dtype()
        )));
    }
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

impl Dataset {
    /// Create a dataset from a feature matrix, targets and identifiers
    pub fn new(
        schema: FeatureSchema,
        features: Array2<f64>,
        targets: Array1<f64>,
        identifiers: Vec<String>,
    ) -> Result<Self> {
        if features.ncols() != schema.len() {
            return Err(SolsweepError::ShapeError {
                expected: format!("{} feature columns", schema.len()),
                actual: format!("{} feature columns", features.ncols()),
            });
        }
        if targets.len() != features.nrows() {
            return Err(SolsweepError::ShapeError {
                expected: format!("{} targets", features.nrows()),
                actual: format!("{} targets", targets.len()),
            });
        }
        if identifiers.len() != features.nrows() {
            return Err(SolsweepError::ShapeError {
                expected: format!("{} identifiers", features.nrows()),
                actual: format!("{} identifiers", identifiers.len()),
            });
        }
        if let Some(row) = targets.iter().position(|t| !t.is_finite()) {
            return Err(SolsweepError::ValidationError(format!(
                "target for '{}' is not finite",
                identifiers[row]
            )));
        }
        if let Some(((row, col), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(SolsweepError::ValidationError(format!(
                "feature '{}' for '{}' is not finite",
                schema.names()[col],
                identifiers[row]
            )));
        }

        Ok(Self {
            schema,
            features,
            targets,
            identifiers,
        })
    }

    /// Build a dataset from rows of (features, target, identifier)
    pub fn from_rows(schema: FeatureSchema, rows: Vec<(FeatureVector, f64, String)>) -> Result<Self> {
        let n_rows = rows.len();
        let n_features = schema.len();
        let mut features = Array2::zeros((n_rows, n_features));
        let mut targets = Array1::zeros(n_rows);
        let mut identifiers = Vec::with_capacity(n_rows);

        for (i, (fv, target, id)) in rows.into_iter().enumerate() {
            if fv.schema() != &schema {
                return Err(SolsweepError::ValidationError(format!(
                    "row '{}' has schema {}, expected {}",
                    id,
                    fv.schema(),
                    schema
                )));
            }
            features.row_mut(i).assign(&Array1::from_vec(fv.values().to_vec()));
            targets[i] = target;
            identifiers.push(id);
        }

        Self::new(schema, features, targets, identifiers)
    }

    /// Featurize (identifier, target) records, excluding identifiers the extractor rejects
    /// or whose target is not finite.
    pub fn from_identifiers<E, I, S>(extractor: &E, records: I) -> Result<(Self, Vec<SkippedRecord>)>
    where
        E: FeatureExtractor + ?Sized,
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut rows = Vec::new();
        let mut skipped = Vec::new();

        for (id, target) in records {
            let id: String = id.into();
            if !target.is_finite() {
                skipped.push(SkippedRecord {
                    identifier: id,
                    reason: format!("target is not finite ({})", target),
                });
                continue;
            }
            match extractor.extract(&id) {
                Ok(fv) => rows.push((fv, target, id)),
                Err(e) => skipped.push(SkippedRecord {
                    identifier: id,
                    reason: e.to_string(),
                }),
            }
        }

        if !skipped.is_empty() {
            warn!(n_skipped = skipped.len(), n_kept = rows.len(), "Excluded records that failed featurization");
        }

        let dataset = Self::from_rows(extractor.schema().clone(), rows)?;
        Ok((dataset, skipped))
    }

    /// Build a dataset from a DataFrame of precomputed descriptors.
    ///
    /// When `feature_columns` is `None`, every numeric column other than the target and
    /// identifier columns is used. Rows with a missing or non-finite value are dropped.
    pub fn from_dataframe(
        df: &DataFrame,
        target_column: &str,
        feature_columns: Option<&[String]>,
        id_column: Option<&str>,
    ) -> Result<Self> {
        let feature_names: Vec<String> = match feature_columns {
            Some(cols) => cols.to_vec(),
            None => df
                .get_columns()
                .iter()
                .filter(|c| {
                    let name = c.name().as_str();
                    name != target_column && Some(name) != id_column && is_numeric(c.dtype())
                })
                .map(|c| c.name().to_string())
                .collect(),
        };
        let schema = FeatureSchema::new(feature_names)?;

        let target = float_column(df, target_column)?;
        let columns: Vec<Vec<Option<f64>>> = schema
            .names()
            .iter()
            .map(|name| float_column(df, name))
            .collect::<Result<_>>()?;
        let ids: Vec<String> = match id_column {
            Some(name) => {
                let series = df
                    .column(name)
                    .map_err(|_| SolsweepError::DataError(format!("column '{}' not found", name)))?
                    .as_materialized_series()
                    .cast(&DataType::String)?;
                series
                    .str()?
                    .into_iter()
                    .enumerate()
                    .map(|(i, s)| s.map(str::to_string).unwrap_or_else(|| format!("row-{}", i)))
                    .collect()
            }
            None => (0..df.height()).map(|i| format!("row-{}", i)).collect(),
        };

        let mut flat = Vec::with_capacity(df.height() * schema.len());
        let mut targets = Vec::with_capacity(df.height());
        let mut identifiers = Vec::with_capacity(df.height());
        let mut dropped = 0usize;

        for row in 0..df.height() {
            let values: Option<Vec<f64>> = columns
                .iter()
                .map(|col| col[row].filter(|v| v.is_finite()))
                .collect();
            match (values, target[row].filter(|t| t.is_finite())) {
                (Some(values), Some(t)) => {
                    flat.extend(values);
                    targets.push(t);
                    identifiers.push(ids[row].clone());
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, "Dropped rows with missing or non-finite values");
        }

        let features = Array2::from_shape_vec((targets.len(), schema.len()), flat)?;
        debug!(
            n_rows = targets.len(),
            n_features = schema.len(),
            schema = %schema,
            "Built dataset from DataFrame"
        );
        Self::new(schema, features, Array1::from_vec(targets), identifiers)
    }

    /// Rows at the given indices, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            features: self.features.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
            identifiers: indices.iter().map(|&i| self.identifiers[i].clone()).collect(),
        }
    }

    /// Same rows and schema with a replaced feature matrix
    pub(crate) fn with_features(&self, features: Array2<f64>) -> Result<Self> {
        Self::new(
            self.schema.clone(),
            features,
            self.targets.clone(),
            self.identifiers.clone(),
        )
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn targets(&self) -> &Array1<f64> {
        &self.targets
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }
}
