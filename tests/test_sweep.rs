//! Integration test: descriptor table to sweep table

use polars::prelude::*;
use solsweep::data::{train_test_split, Dataset, DescriptorTable, FeatureSchema, SOLUBILITY_DESCRIPTORS};
use solsweep::preprocessing::StandardScaler;
use solsweep::sweep::{HyperparameterGrid, MaxDepth, SweepConfig, SweepEvaluator};
use solsweep::SolsweepError;

/// Synthetic descriptors with a logS that is mostly linear in logP and weight
fn solubility_df(n: usize) -> DataFrame {
    let ids: Vec<String> = (0..n).map(|i| format!("mol-{:03}", i)).collect();
    let mol_wt: Vec<f64> = (0..n).map(|i| 80.0 + ((i * 37) % 300) as f64).collect();
    let rot: Vec<f64> = (0..n).map(|i| ((i * 7) % 9) as f64).collect();
    let logp: Vec<f64> = (0..n).map(|i| -2.0 + ((i * 13) % 60) as f64 / 10.0).collect();
    let aromatic: Vec<f64> = (0..n).map(|i| ((i * 11) % 10) as f64 / 10.0).collect();
    let logs: Vec<f64> = (0..n)
        .map(|i| 0.26 - 0.0066 * mol_wt[i] + 0.0034 * rot[i] - 0.74 * logp[i] - 0.42 * aromatic[i])
        .collect();

    df!(
        "id" => ids,
        "MolWt" => mol_wt,
        "NumRotatableBonds" => rot,
        "MolLogP" => logp,
        "AromaticProportion" => aromatic,
        "logS" => logs
    )
    .unwrap()
}

fn scaled_split(df: &DataFrame) -> (Dataset, Dataset) {
    let dataset = Dataset::from_dataframe(df, "logS", None, Some("id")).unwrap();
    let split = train_test_split(&dataset, 0.2, 42).unwrap();
    let (_, scaled) = StandardScaler::scale_split(&split).unwrap();
    scaled.into_parts()
}

#[test]
fn test_sweep_over_descriptor_frame() {
    let (train, test) = scaled_split(&solubility_df(80));
    assert_eq!(train.schema(), &FeatureSchema::solubility());
    assert_eq!((train.n_rows(), test.n_rows()), (64, 16));

    let grid = HyperparameterGrid::new(vec![50, 100], vec![MaxDepth::Limited(1), MaxDepth::Limited(3)]);
    let table = SweepEvaluator::default().run(&train, &test, &grid).unwrap();

    let cells: Vec<(usize, MaxDepth)> = table.iter().map(|r| (r.tree_count, r.max_depth)).collect();
    assert_eq!(
        cells,
        vec![
            (50, MaxDepth::Limited(1)),
            (50, MaxDepth::Limited(3)),
            (100, MaxDepth::Limited(1)),
            (100, MaxDepth::Limited(3)),
        ]
    );
    for r in &table {
        assert!(r.mse >= 0.0, "mse must be non-negative: {:?}", r);
        assert!(r.r2 <= 1.0, "r2 must not exceed 1: {:?}", r);
    }

    // Deeper trees fit a smooth target better than stumps
    let stump = table.get(100, MaxDepth::Limited(1)).unwrap();
    let deeper = table.get(100, MaxDepth::Limited(3)).unwrap();
    assert!(deeper.mse < stump.mse);
}

#[test]
fn test_default_grid_is_reproducible() {
    let (train, test) = scaled_split(&solubility_df(60));
    let grid = HyperparameterGrid::default();

    let first = SweepEvaluator::new(SweepConfig::default()).run(&train, &test, &grid).unwrap();
    let second = SweepEvaluator::new(SweepConfig::default().with_n_jobs(1))
        .run(&train, &test, &grid)
        .unwrap();

    assert_eq!(first.len(), 12);
    assert_eq!(first, second);
}

#[test]
fn test_schema_mismatch_three_vs_four_columns() {
    let df = solubility_df(40);
    let four = Dataset::from_dataframe(&df, "logS", None, Some("id")).unwrap();
    let three_cols: Vec<String> = SOLUBILITY_DESCRIPTORS[..3].iter().map(|s| s.to_string()).collect();
    let three = Dataset::from_dataframe(&df, "logS", Some(&three_cols), Some("id")).unwrap();

    let err = SweepEvaluator::default()
        .run(&three, &four, &HyperparameterGrid::default())
        .unwrap_err();
    match err {
        SolsweepError::SchemaMismatch { train, test } => {
            assert_eq!(train.len(), 3);
            assert_eq!(test.len(), 4);
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_zero_tree_count_rejected() {
    let (train, test) = scaled_split(&solubility_df(30));
    let grid = HyperparameterGrid::new(vec![0], vec![MaxDepth::Limited(3)]);
    let err = SweepEvaluator::default().run(&train, &test, &grid).unwrap_err();
    assert!(matches!(err, SolsweepError::InvalidHyperparameter { .. }));
}

#[test]
fn test_extractor_excludes_unknown_identifiers() {
    let df = solubility_df(20);
    let table = DescriptorTable::from_dataframe(&df, "id", FeatureSchema::solubility()).unwrap();

    let mut records: Vec<(String, f64)> = (0..20).map(|i| (format!("mol-{:03}", i), -1.0 - i as f64 * 0.1)).collect();
    records.push(("c1ccccc1-not-in-table".to_string(), -2.0));

    let (dataset, skipped) = Dataset::from_identifiers(&table, records).unwrap();
    assert_eq!(dataset.n_rows(), 20);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].identifier, "c1ccccc1-not-in-table");
}
