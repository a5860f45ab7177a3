//! Feature schemas, feature vectors and descriptor extraction

use crate::error::{Result, SolsweepError};
use polars::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Descriptor columns used for the solubility model
pub const SOLUBILITY_DESCRIPTORS: [&str; 4] = [
    "MolWt",
    "NumRotatableBonds",
    "MolLogP",
    "AromaticProportion",
];

/// Ordered list of feature names shared by every row of a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Arc<[String]>,
}

impl FeatureSchema {
    /// Create a schema; names must be non-empty and unique
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(SolsweepError::ValidationError(
                "feature schema needs at least one feature".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SolsweepError::ValidationError(format!(
                    "duplicate feature name '{}'",
                    name
                )));
            }
        }
        Ok(Self { names: names.into() })
    }

    /// The default four-descriptor solubility schema
    pub fn solubility() -> Self {
        Self {
            names: SOLUBILITY_DESCRIPTORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names.join(", "))
    }
}

/// One row of descriptor values, tied to its schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create a feature vector; length must match the schema and values must be finite
    pub fn new(schema: FeatureSchema, values: Vec<f64>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(SolsweepError::ShapeError {
                expected: format!("{} features", schema.len()),
                actual: format!("{} features", values.len()),
            });
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(SolsweepError::ValidationError(format!(
                "feature '{}' is not finite ({})",
                schema.names()[idx],
                values[idx]
            )));
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Look up a value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|i| self.values[i])
    }
}

/// Converts a molecular identifier into a feature vector
pub trait FeatureExtractor: Send + Sync {
    /// Schema of every vector this extractor produces
    fn schema(&self) -> &FeatureSchema;

    /// Extract descriptors for one identifier
    fn extract(&self, identifier: &str) -> Result<FeatureVector>;
}

/// Extractor backed by precomputed descriptors keyed by identifier
#[derive(Debug, Clone)]
pub struct DescriptorTable {
    schema: FeatureSchema,
    rows: HashMap<String, Vec<f64>>,
}

impl DescriptorTable {
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            rows: HashMap::new(),
        }
    }

    /// Register descriptors for an identifier, replacing any previous entry
    pub fn insert(&mut self, identifier: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.schema.len() {
            return Err(SolsweepError::ShapeError {
                expected: format!("{} descriptors", self.schema.len()),
                actual: format!("{} descriptors", values.len()),
            });
        }
        self.rows.insert(identifier.into(), values);
        Ok(())
    }

    /// Build a table from a DataFrame with one identifier column and one column per feature.
    /// Missing cells are kept as NaN so that extraction of that identifier fails.
    pub fn from_dataframe(df: &DataFrame, id_column: &str, schema: FeatureSchema) -> Result<Self> {
        let ids_series = df
            .column(id_column)
            .map_err(|_| SolsweepError::DataError(format!("column '{}' not found", id_column)))?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let ids = ids_series.str()?;

        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(schema.len());
        for name in schema.names() {
            let series = df
                .column(name)
                .map_err(|_| SolsweepError::DataError(format!("column '{}' not found", name)))?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            columns.push(series.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect());
        }

        let mut table = Self::new(schema);
        for (row, id) in ids.into_iter().enumerate() {
            let Some(id) = id else { continue };
            let values = columns.iter().map(|col| col[row]).collect();
            table.insert(id, values)?;
        }
        debug!(n_entries = table.len(), "Built descriptor table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FeatureExtractor for DescriptorTable {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn extract(&self, identifier: &str) -> Result<FeatureVector> {
        let values = self.rows.get(identifier).ok_or_else(|| SolsweepError::ParseError {
            identifier: identifier.to_string(),
            reason: "no descriptors available".to_string(),
        })?;
        FeatureVector::new(self.schema.clone(), values.clone()).map_err(|e| {
            SolsweepError::ParseError {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_duplicates() {
        assert!(FeatureSchema::new(["a", "b", "a"]).is_err());
        assert!(FeatureSchema::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_solubility_schema() {
        let schema = FeatureSchema::solubility();
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.index_of("MolLogP"), Some(2));
    }

    #[test]
    fn test_feature_vector_validation() {
        let schema = FeatureSchema::new(["x", "y"]).unwrap();
        assert!(FeatureVector::new(schema.clone(), vec![1.0]).is_err());
        assert!(FeatureVector::new(schema.clone(), vec![1.0, f64::NAN]).is_err());

        let fv = FeatureVector::new(schema, vec![1.0, 2.0]).unwrap();
        assert_eq!(fv.get("y"), Some(2.0));
        assert_eq!(fv.get("z"), None);
    }

    #[test]
    fn test_descriptor_table_extract() {
        let mut table = DescriptorTable::new(FeatureSchema::solubility());
        table.insert("CCO", vec![46.07, 0.0, -0.0014, 0.0]).unwrap();
        table.insert("c1ccccc1", vec![78.11, 0.0, 1.6866, f64::NAN]).unwrap();

        let fv = table.extract("CCO").unwrap();
        assert_eq!(fv.get("MolWt"), Some(46.07));

        assert!(matches!(
            table.extract("not-a-molecule"),
            Err(SolsweepError::ParseError { .. })
        ));
        assert!(matches!(
            table.extract("c1ccccc1"),
            Err(SolsweepError::ParseError { .. })
        ));
    }

    #[test]
    fn test_descriptor_table_from_dataframe() {
        let df = df!(
            "SMILES" => &["CCO", "CCC"],
            "x" => &[1.0, 2.0],
            "y" => &[Some(3.0), None]
        )
        .unwrap();

        let schema = FeatureSchema::new(["x", "y"]).unwrap();
        let table = DescriptorTable::from_dataframe(&df, "SMILES", schema).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.extract("CCO").unwrap().values(), &[1.0, 3.0]);
        assert!(table.extract("CCC").is_err());
    }
}
