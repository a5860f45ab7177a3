//! Exhaustive grid evaluation against one fixed train/test split

use super::config::SweepConfig;
use super::grid::{GridCell, HyperparameterGrid, MaxDepth};
use super::table::{SweepResult, SweepTable};
use crate::data::Dataset;
use crate::error::{Result, SolsweepError};
use crate::training::{mean_squared_error, r2_score, EnsembleTrainer, RandomForestTrainer, Regressor};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fits one fresh ensemble per grid cell and scores it on the test partition.
///
/// Cells run on a bounded rayon pool, but the returned table is always in row-major
/// grid order. If any cell fails, the sweep reports the first failing cell in that
/// order and returns no partial results.
pub struct SweepEvaluator<T: EnsembleTrainer = RandomForestTrainer> {
    trainer: T,
    config: SweepConfig,
}

impl SweepEvaluator<RandomForestTrainer> {
    /// Random forest sweep using the tree settings from `config`
    pub fn new(config: SweepConfig) -> Self {
        let trainer = RandomForestTrainer::from(&config);
        Self { trainer, config }
    }
}

impl Default for SweepEvaluator<RandomForestTrainer> {
    fn default() -> Self {
        Self::new(SweepConfig::default())
    }
}

impl<T: EnsembleTrainer> SweepEvaluator<T> {
    /// Sweep with a custom model trainer
    pub fn with_trainer(trainer: T, config: SweepConfig) -> Self {
        Self { trainer, config }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Check inputs before any model is built
    fn validate(&self, train: &Dataset, test: &Dataset, grid: &HyperparameterGrid) -> Result<()> {
        grid.validate()?;
        if train.schema() != test.schema() {
            return Err(SolsweepError::SchemaMismatch {
                train: train.schema().names().to_vec(),
                test: test.schema().names().to_vec(),
            });
        }
        if train.is_empty() {
            return Err(SolsweepError::EmptyDataset("train".to_string()));
        }
        if test.is_empty() {
            return Err(SolsweepError::EmptyDataset("test".to_string()));
        }
        Ok(())
    }

    fn cell_seed(&self) -> u64 {
        self.config.random_state.unwrap_or_else(rand::random)
    }

    /// Evaluate every grid cell on `train`/`test`, both already scaled with parameters
    /// fit on the training partition.
    pub fn run(&self, train: &Dataset, test: &Dataset, grid: &HyperparameterGrid) -> Result<SweepTable> {
        self.validate(train, test, grid)?;

        let cells: Vec<(GridCell, u64)> = grid.cells().map(|c| (c, self.cell_seed())).collect();
        info!(
            n_cells = cells.len(),
            n_train = train.n_rows(),
            n_test = test.n_rows(),
            n_features = train.n_features(),
            n_jobs = ?self.config.n_jobs,
            random_state = ?self.config.random_state,
            "Starting hyperparameter sweep"
        );
        let start = Instant::now();

        let evaluate = |(cell, seed): &(GridCell, u64)| self.evaluate_cell(cell, *seed, train, test);
        let results: Vec<SweepResult> = match self.config.n_jobs {
            Some(1) => cells.iter().map(evaluate).collect::<Result<_>>()?,
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SolsweepError::ThreadPoolError(e.to_string()))?;
                let outcomes: Vec<Result<SweepResult>> = pool.install(|| cells.par_iter().map(evaluate).collect());
                outcomes.into_iter().collect::<Result<_>>()?
            }
            None => {
                let outcomes: Vec<Result<SweepResult>> = cells.par_iter().map(evaluate).collect();
                outcomes.into_iter().collect::<Result<_>>()?
            }
        };

        let table = SweepTable::new(results);
        if let Some(best) = table.best_by_mse() {
            info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                best_tree_count = best.tree_count,
                best_max_depth = %best.max_depth,
                best_mse = best.mse,
                best_r2 = best.r2,
                "Sweep finished"
            );
        }
        Ok(table)
    }

    fn evaluate_cell(&self, cell: &GridCell, seed: u64, train: &Dataset, test: &Dataset) -> Result<SweepResult> {
        let start = Instant::now();
        let outcome = self.fit_and_score(cell.tree_count, cell.max_depth, seed, train, test);

        match outcome {
            Ok((mse, r2)) => {
                debug!(
                    cell = cell.index,
                    tree_count = cell.tree_count,
                    max_depth = %cell.max_depth,
                    mse,
                    r2,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Evaluated grid cell"
                );
                Ok(SweepResult {
                    tree_count: cell.tree_count,
                    max_depth: cell.max_depth,
                    mse,
                    r2,
                    seed,
                })
            }
            Err(e) => {
                let err = e.at_cell(cell.tree_count, cell.max_depth);
                warn!(cell = cell.index, error = %err, "Grid cell failed");
                Err(err)
            }
        }
    }

    fn fit_and_score(
        &self,
        tree_count: usize,
        max_depth: MaxDepth,
        seed: u64,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<(f64, f64)> {
        let mut model = self.trainer.configure(tree_count, max_depth, seed);
        model.fit(train.features(), train.targets())?;
        let predictions = model.predict(test.features())?;
        if predictions.iter().any(|v| !v.is_finite()) {
            return Err(SolsweepError::ComputationError(
                "model produced a non-finite prediction".to_string(),
            ));
        }

        let mse = mean_squared_error(test.targets(), &predictions)?;
        let r2 = r2_score(test.targets(), &predictions)?;
        Ok((mse, r2))
    }

    /// Refit the model behind one sweep result on `train`, e.g. to inspect the winner.
    ///
    /// The result's seed is reused, so the refit reproduces the scored model even when
    /// the sweep drew fresh seeds.
    pub fn fit_cell(&self, train: &Dataset, result: &SweepResult) -> Result<T::Model> {
        if train.is_empty() {
            return Err(SolsweepError::EmptyDataset("train".to_string()));
        }
        let mut model = self.trainer.configure(result.tree_count, result.max_depth, result.seed);
        model
            .fit(train.features(), train.targets())
            .map_err(|e| e.at_cell(result.tree_count, result.max_depth))?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureSchema;
    use ndarray::{Array1, Array2};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn dataset(n: usize, names: &[&str], offset: usize) -> Dataset {
        let schema = FeatureSchema::new(names.iter().copied()).unwrap();
        let k = names.len();
        let features = Array2::from_shape_fn((n, k), |(i, j)| ((i + offset) * (j + 1) % 17) as f64);
        let targets = Array1::from_shape_fn(n, |i| features.row(i).sum() * 0.3 - 1.0);
        let ids = (0..n).map(|i| format!("m{}", i + offset)).collect();
        Dataset::new(schema, features, targets, ids).unwrap()
    }

    /// Counts fits and fails on the configured tree count
    struct CountingTrainer {
        fits: Arc<AtomicUsize>,
        fail_on: Option<usize>,
    }

    struct CountingModel {
        inner: crate::training::RandomForestRegressor,
        fits: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Regressor for CountingModel {
        fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
            self.fits.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SolsweepError::ComputationError("diverged".to_string()));
            }
            self.inner.fit(x, y).map(|_| ())
        }

        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
            self.inner.predict(x)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    impl EnsembleTrainer for CountingTrainer {
        type Model = CountingModel;

        fn configure(&self, tree_count: usize, max_depth: MaxDepth, seed: u64) -> CountingModel {
            CountingModel {
                inner: RandomForestTrainer::default().configure(tree_count, max_depth, seed),
                fits: Arc::clone(&self.fits),
                fail: self.fail_on == Some(tree_count),
            }
        }
    }

    #[test]
    fn test_row_major_order() {
        let train = dataset(40, &["a", "b", "c"], 0);
        let test = dataset(10, &["a", "b", "c"], 40);
        let grid = HyperparameterGrid::new(vec![5, 3], vec![MaxDepth::Limited(1), MaxDepth::Unbounded]);

        let table = SweepEvaluator::default().run(&train, &test, &grid).unwrap();
        let order: Vec<(usize, MaxDepth)> = table.iter().map(|r| (r.tree_count, r.max_depth)).collect();
        assert_eq!(
            order,
            vec![
                (5, MaxDepth::Limited(1)),
                (5, MaxDepth::Unbounded),
                (3, MaxDepth::Limited(1)),
                (3, MaxDepth::Unbounded),
            ]
        );
        for r in &table {
            assert!(r.mse >= 0.0);
            assert!(r.r2 <= 1.0);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let train = dataset(50, &["a", "b", "c"], 0);
        let test = dataset(12, &["a", "b", "c"], 50);
        let grid = HyperparameterGrid::new(vec![4, 8], vec![MaxDepth::Limited(2), MaxDepth::Unbounded]);

        let sequential = SweepEvaluator::new(SweepConfig::default().with_n_jobs(1))
            .run(&train, &test, &grid)
            .unwrap();
        let parallel = SweepEvaluator::new(SweepConfig::default().with_n_jobs(3))
            .run(&train, &test, &grid)
            .unwrap();
        let rerun = SweepEvaluator::new(SweepConfig::default().with_n_jobs(3))
            .run(&train, &test, &grid)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(parallel, rerun);
    }

    #[test]
    fn test_validation_happens_before_any_fit() {
        let fits = Arc::new(AtomicUsize::new(0));
        let evaluator = SweepEvaluator::with_trainer(
            CountingTrainer { fits: Arc::clone(&fits), fail_on: None },
            SweepConfig::default(),
        );
        let train = dataset(20, &["a", "b", "c"], 0);
        let wide_test = dataset(5, &["a", "b", "c", "d"], 20);
        let grid = HyperparameterGrid::new(vec![2], vec![MaxDepth::Limited(2)]);

        assert!(matches!(
            evaluator.run(&train, &wide_test, &grid),
            Err(SolsweepError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            evaluator.run(&train, &train, &HyperparameterGrid::new(vec![0], vec![MaxDepth::Limited(2)])),
            Err(SolsweepError::InvalidHyperparameter { .. })
        ));
        assert!(matches!(
            evaluator.run(&train, &train.select(&[]), &grid),
            Err(SolsweepError::EmptyDataset(_))
        ));
        assert_eq!(fits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fit_failure_aborts_with_cell_parameters() {
        let fits = Arc::new(AtomicUsize::new(0));
        let evaluator = SweepEvaluator::with_trainer(
            CountingTrainer { fits: Arc::clone(&fits), fail_on: Some(4) },
            SweepConfig::default().with_n_jobs(1),
        );
        let train = dataset(20, &["a", "b"], 0);
        let test = dataset(5, &["a", "b"], 20);
        let grid = HyperparameterGrid::new(vec![2, 4, 6], vec![MaxDepth::Unbounded, MaxDepth::Limited(2)]);

        match evaluator.run(&train, &test, &grid) {
            Err(SolsweepError::FitFailure { tree_count, max_depth, reason }) => {
                assert_eq!(tree_count, 4);
                assert_eq!(max_depth, MaxDepth::Unbounded);
                assert!(reason.contains("diverged"));
            }
            other => panic!("expected FitFailure, got {:?}", other),
        }
        // Sequential execution stops at the first failing cell
        assert_eq!(fits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_parallel_failure_reports_first_cell_in_grid_order() {
        let evaluator = SweepEvaluator::with_trainer(
            CountingTrainer { fits: Arc::new(AtomicUsize::new(0)), fail_on: Some(4) },
            SweepConfig::default().with_n_jobs(4),
        );
        let train = dataset(20, &["a", "b"], 0);
        let test = dataset(5, &["a", "b"], 20);
        let grid = HyperparameterGrid::new(vec![4, 2], vec![MaxDepth::Limited(3), MaxDepth::Limited(1)]);

        match evaluator.run(&train, &test, &grid) {
            Err(SolsweepError::FitFailure { tree_count, max_depth, .. }) => {
                assert_eq!((tree_count, max_depth), (4, MaxDepth::Limited(3)));
            }
            other => panic!("expected FitFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_fit_cell_reproduces_scored_model() {
        let train = dataset(30, &["a", "b"], 0);
        let test = dataset(8, &["a", "b"], 30);
        let grid = HyperparameterGrid::new(vec![6, 3], vec![MaxDepth::Limited(3), MaxDepth::Unbounded]);

        for config in [
            SweepConfig::default().with_random_state(11),
            SweepConfig::default().without_random_state(),
        ] {
            let evaluator = SweepEvaluator::new(config);
            let table = evaluator.run(&train, &test, &grid).unwrap();

            for result in &table {
                let model = evaluator.fit_cell(&train, result).unwrap();
                let preds = model.predict(test.features()).unwrap();
                let mse = mean_squared_error(test.targets(), &preds).unwrap();
                assert_eq!(mse, result.mse);
            }
        }
    }
}
