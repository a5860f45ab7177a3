//! Hyperparameter grid for tree-ensemble sweeps

use crate::error::{Result, SolsweepError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Depth limit for each tree in an ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxDepth {
    /// Trees stop splitting at this depth
    Limited(usize),
    /// Trees grow until leaves are pure or too small to split
    Unbounded,
}

impl MaxDepth {
    pub fn as_option(self) -> Option<usize> {
        match self {
            MaxDepth::Limited(d) => Some(d),
            MaxDepth::Unbounded => None,
        }
    }
}

impl From<Option<usize>> for MaxDepth {
    fn from(depth: Option<usize>) -> Self {
        depth.map_or(MaxDepth::Unbounded, MaxDepth::Limited)
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDepth::Limited(d) => write!(f, "{}", d),
            MaxDepth::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl FromStr for MaxDepth {
    type Err = SolsweepError;

    /// Accepts a positive-or-zero integer, or `none` / `unbounded` for no limit
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "unbounded" | "null" => Ok(MaxDepth::Unbounded),
            other => other.parse::<usize>().map(MaxDepth::Limited).map_err(|_| {
                SolsweepError::InvalidHyperparameter {
                    name: "max_depth".to_string(),
                    value: s.to_string(),
                    reason: "expected a positive integer or 'none'".to_string(),
                }
            }),
        }
    }
}

impl Serialize for MaxDepth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MaxDepth::Limited(d) => serializer.serialize_u64(*d as u64),
            MaxDepth::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for MaxDepth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Depth(usize),
            Text(String),
            Null(()),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Depth(d) => Ok(MaxDepth::Limited(d)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Null(()) => Ok(MaxDepth::Unbounded),
        }
    }
}

/// One (tree_count, max_depth) combination and its row-major position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub index: usize,
    pub tree_count: usize,
    pub max_depth: MaxDepth,
}

/// Cartesian product of tree counts and depth limits, iterated tree counts outer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterGrid {
    pub tree_counts: Vec<usize>,
    pub max_depths: Vec<MaxDepth>,
}

impl Default for HyperparameterGrid {
    fn default() -> Self {
        Self {
            tree_counts: vec![10, 50, 100],
            max_depths: vec![
                MaxDepth::Limited(1),
                MaxDepth::Limited(3),
                MaxDepth::Limited(5),
                MaxDepth::Unbounded,
            ],
        }
    }
}

impl HyperparameterGrid {
    pub fn new(tree_counts: Vec<usize>, max_depths: Vec<MaxDepth>) -> Self {
        Self {
            tree_counts,
            max_depths,
        }
    }

    /// Reject empty axes, zero tree counts and zero depth limits
    pub fn validate(&self) -> Result<()> {
        if self.tree_counts.is_empty() {
            return Err(SolsweepError::InvalidHyperparameter {
                name: "tree_counts".to_string(),
                value: "[]".to_string(),
                reason: "at least one tree count is required".to_string(),
            });
        }
        if self.max_depths.is_empty() {
            return Err(SolsweepError::InvalidHyperparameter {
                name: "max_depths".to_string(),
                value: "[]".to_string(),
                reason: "at least one depth is required".to_string(),
            });
        }
        if let Some(&t) = self.tree_counts.iter().find(|&&t| t == 0) {
            return Err(SolsweepError::InvalidHyperparameter {
                name: "tree_count".to_string(),
                value: t.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if let Some(d) = self.max_depths.iter().find(|d| **d == MaxDepth::Limited(0)) {
            return Err(SolsweepError::InvalidHyperparameter {
                name: "max_depth".to_string(),
                value: d.to_string(),
                reason: "must be positive or unbounded".to_string(),
            });
        }
        Ok(())
    }

    /// Number of cells in the grid
    pub fn len(&self) -> usize {
        self.tree_counts.len() * self.max_depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.tree_counts
            .iter()
            .flat_map(move |&tree_count| {
                self.max_depths
                    .iter()
                    .map(move |&max_depth| (tree_count, max_depth))
            })
            .enumerate()
            .map(|(index, (tree_count, max_depth))| GridCell {
                index,
                tree_count,
                max_depth,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_row_major() {
        let grid = HyperparameterGrid::new(vec![50, 100], vec![MaxDepth::Limited(1), MaxDepth::Limited(3)]);
        let cells: Vec<(usize, MaxDepth)> = grid.cells().map(|c| (c.tree_count, c.max_depth)).collect();
        assert_eq!(
            cells,
            vec![
                (50, MaxDepth::Limited(1)),
                (50, MaxDepth::Limited(3)),
                (100, MaxDepth::Limited(1)),
                (100, MaxDepth::Limited(3)),
            ]
        );
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.cells().last().unwrap().index, 3);
    }

    #[test]
    fn test_validate() {
        assert!(HyperparameterGrid::default().validate().is_ok());
        assert!(HyperparameterGrid::new(vec![0], vec![MaxDepth::Limited(1)]).validate().is_err());
        assert!(HyperparameterGrid::new(vec![5], vec![MaxDepth::Limited(0)]).validate().is_err());
        assert!(HyperparameterGrid::new(vec![], vec![MaxDepth::Unbounded]).validate().is_err());
        assert!(HyperparameterGrid::new(vec![5], vec![]).validate().is_err());
    }

    #[test]
    fn test_max_depth_parse() {
        assert_eq!("3".parse::<MaxDepth>().unwrap(), MaxDepth::Limited(3));
        assert_eq!("None".parse::<MaxDepth>().unwrap(), MaxDepth::Unbounded);
        assert!("-1".parse::<MaxDepth>().is_err());
    }

    #[test]
    fn test_max_depth_serde() {
        let json = serde_json::to_string(&vec![MaxDepth::Limited(4), MaxDepth::Unbounded]).unwrap();
        assert_eq!(json, r#"[4,"unbounded"]"#);

        let parsed: Vec<MaxDepth> = serde_json::from_str(r#"[2, "none", null]"#).unwrap();
        assert_eq!(parsed, vec![MaxDepth::Limited(2), MaxDepth::Unbounded, MaxDepth::Unbounded]);
    }
}
