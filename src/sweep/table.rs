//! Sweep results

use super::grid::MaxDepth;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Test-set performance of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub tree_count: usize,
    pub max_depth: MaxDepth,
    pub mse: f64,
    pub r2: f64,
    /// Seed the cell's forest was grown from; not serialized
    #[serde(skip)]
    pub seed: u64,
}

/// Sweep results in row-major grid order.
///
/// The table is never reordered; use [`SweepTable::best_by_mse`] or
/// [`SweepTable::best_by_r2`] to pick a winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepTable {
    results: Vec<SweepResult>,
}

impl SweepTable {
    pub(crate) fn new(results: Vec<SweepResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[SweepResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SweepResult> {
        self.results.iter()
    }

    /// Result for a specific cell
    pub fn get(&self, tree_count: usize, max_depth: MaxDepth) -> Option<&SweepResult> {
        self.results
            .iter()
            .find(|r| r.tree_count == tree_count && r.max_depth == max_depth)
    }

    /// Lowest MSE; the earliest cell wins ties
    pub fn best_by_mse(&self) -> Option<&SweepResult> {
        self.results.iter().fold(None, |best, r| match best {
            Some(b) if b.mse <= r.mse => Some(b),
            _ => Some(r),
        })
    }

    /// Highest R2; the earliest cell wins ties
    pub fn best_by_r2(&self) -> Option<&SweepResult> {
        self.results.iter().fold(None, |best, r| match best {
            Some(b) if b.r2 >= r.r2 => Some(b),
            _ => Some(r),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn into_results(self) -> Vec<SweepResult> {
        self.results
    }
}

impl<'a> IntoIterator for &'a SweepTable {
    type Item = &'a SweepResult;
    type IntoIter = std::slice::Iter<'a, SweepResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl fmt::Display for SweepTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10}  {:>10}  {:>12}  {:>10}", "tree_count", "max_depth", "mse", "r2")?;
        for r in &self.results {
            writeln!(
                f,
                "{:>10}  {:>10}  {:>12.6}  {:>10.6}",
                r.tree_count,
                r.max_depth.to_string(),
                r.mse,
                r.r2
            )?;
        }
        Ok(())
    }
}
