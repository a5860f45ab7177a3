//! solsweep CLI Module
//!
//! Command-line interface for sweeping, comparing models and inspecting descriptor files.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::ExperimentConfig;
use crate::data::{train_test_split, Dataset};
use crate::preprocessing::StandardScaler;
use crate::sweep::{MaxDepth, SweepEvaluator};
use crate::training::{
    cross_validate, CVStrategy, CrossValidator, LinearRegression, RandomForestRegressor, RegressionMetrics,
};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "solsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hyperparameter sweeps for solubility regression")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sweep random forest tree counts and depth limits
    Sweep {
        /// Descriptor file (CSV, JSON, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: Option<String>,

        /// Identifier column name
        #[arg(long)]
        id_column: Option<String>,

        /// Feature columns (default: every numeric non-target column)
        #[arg(long, value_delimiter = ',')]
        features: Option<Vec<String>>,

        /// Tree counts to try
        #[arg(long, value_delimiter = ',')]
        trees: Option<Vec<usize>>,

        /// Depth limits to try ("none" for unbounded)
        #[arg(long, value_delimiter = ',')]
        depths: Option<Vec<MaxDepth>>,

        /// Fraction of rows held out for testing
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Seed for the split and every forest
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (1 = sequential)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Experiment config file (JSON); flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the result table as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare linear regression with a random forest
    Compare {
        /// Descriptor file
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: String,

        /// Identifier column name
        #[arg(long)]
        id_column: Option<String>,

        /// Feature columns (default: every numeric non-target column)
        #[arg(long, value_delimiter = ',')]
        features: Option<Vec<String>>,

        /// Fraction of rows held out for testing
        #[arg(long, default_value = "0.2")]
        test_fraction: f64,

        /// Number of cross-validation folds
        #[arg(long, default_value = "5")]
        cv_folds: usize,

        /// Seed for the split, folds and forest
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Show data information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Target column to summarize
        #[arg(short, long)]
        target: Option<String>,
    },
}

/// Command-line overrides for a sweep
#[derive(Debug, Default)]
pub struct SweepArgs {
    pub target: Option<String>,
    pub id_column: Option<String>,
    pub features: Option<Vec<String>>,
    pub trees: Option<Vec<usize>>,
    pub depths: Option<Vec<MaxDepth>>,
    pub test_fraction: Option<f64>,
    pub seed: Option<u64>,
    pub jobs: Option<usize>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl SweepArgs {
    /// Layer flags over the config file (or defaults)
    pub fn resolve(&self) -> crate::Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::from_json_file(path)?,
            None => ExperimentConfig::default(),
        };
        if let Some(target) = &self.target {
            config.target_column = target.clone();
        }
        if self.id_column.is_some() {
            config.id_column = self.id_column.clone();
        }
        if self.features.is_some() {
            config.feature_columns = self.features.clone();
        }
        if let Some(trees) = &self.trees {
            config.grid.tree_counts = trees.clone();
        }
        if let Some(depths) = &self.depths {
            config.grid.max_depths = depths.clone();
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.split_seed = seed;
            config.sweep.random_state = Some(seed);
        }
        if let Some(jobs) = self.jobs {
            config.sweep.n_jobs = Some(jobs);
        }
        config.validate()?;
        Ok(config)
    }
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let df = match ext {
        "csv" => CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        "json" => JsonReader::new(std::fs::File::open(path)?)
            .finish()?,
        "parquet" => ParquetReader::new(std::fs::File::open(path)?)
            .finish()?,
        _ => anyhow::bail!("Unsupported file format: {}", ext),
    };

    Ok(df)
}

fn load_dataset(
    path: &Path,
    target: &str,
    features: Option<&[String]>,
    id_column: Option<&str>,
) -> anyhow::Result<Dataset> {
    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(path)?;
    let dataset = Dataset::from_dataframe(&df, target, features, id_column)?;
    step_done(&format!(
        "{} rows × {} features in {:?}",
        dataset.n_rows(),
        dataset.n_features(),
        start.elapsed()
    ));
    if dataset.n_rows() < df.height() {
        println!(
            "  {} {}",
            "!".yellow(),
            muted(&format!("{} rows dropped for missing values", df.height() - dataset.n_rows()))
        );
    }
    Ok(dataset)
}

fn print_metrics(name: &str, m: &RegressionMetrics) {
    println!(
        "  {:<20} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
        name, m.r2, m.mse, m.rmse, m.mae
    );
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_sweep(data_path: &Path, args: &SweepArgs) -> anyhow::Result<()> {
    section("Sweep");

    let config = args.resolve()?;
    let dataset = load_dataset(
        data_path,
        &config.target_column,
        config.feature_columns.as_deref(),
        config.id_column.as_deref(),
    )?;

    step_run("Splitting and scaling");
    let split = train_test_split(&dataset, config.test_fraction, config.split_seed)?;
    let (_, scaled) = StandardScaler::scale_split(&split)?;
    step_done(&format!("{} train / {} test", scaled.train().n_rows(), scaled.test().n_rows()));

    kv("Target", &config.target_column);
    kv("Features", &scaled.train().schema().to_string());
    kv("Grid", &format!("{} cells", config.grid.len()));

    step_run("Evaluating grid");
    let start = Instant::now();
    let evaluator = SweepEvaluator::new(config.sweep.clone());
    let table = evaluator.run(scaled.train(), scaled.test(), &config.grid)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    for line in table.to_string().lines() {
        println!("  {}", line);
    }

    if let Some(best) = table.best_by_mse() {
        println!();
        println!(
            "  {} {} {} {:.4} {} {:.4}",
            ok("best"),
            format!("tree_count = {}, max_depth = {}", best.tree_count, best.max_depth)
                .white()
                .bold(),
            muted("mse"),
            best.mse,
            muted("r2"),
            best.r2
        );

        let model = evaluator.fit_cell(scaled.train(), best)?;
        if let Some(importances) = model.feature_importances() {
            section("Feature importances");
            let mut ranked: Vec<(&String, f64)> = scaled
                .train()
                .schema()
                .names()
                .iter()
                .zip(importances.iter().copied())
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            for (name, importance) in ranked {
                println!("  {:<24} {:>8.4}", name, importance);
            }
        }
    }

    if let Some(output) = &args.output {
        std::fs::write(output, table.to_json()?)?;
        println!();
        step_ok(&format!("Results written to {}", output.display()));
    }

    println!();
    Ok(())
}

pub fn cmd_compare(
    data_path: &Path,
    target: &str,
    id_column: Option<&str>,
    features: Option<&[String]>,
    test_fraction: f64,
    cv_folds: usize,
    seed: u64,
) -> anyhow::Result<()> {
    section("Compare");

    let dataset = load_dataset(data_path, target, features, id_column)?;
    let split = train_test_split(&dataset, test_fraction, seed)?;
    let (_, scaled) = StandardScaler::scale_split(&split)?;
    let cv = CrossValidator::new(CVStrategy::KFold { n_splits: cv_folds, shuffle: true })
        .with_random_state(seed);

    let make_linear = LinearRegression::new;
    let make_forest = || RandomForestRegressor::new(100).with_random_state(seed);

    step_run("Fitting linear regression");
    let start = Instant::now();
    let mut linear = make_linear();
    linear.fit(scaled.train().features(), scaled.train().targets())?;
    let linear_metrics =
        RegressionMetrics::compute(scaled.test().targets(), &linear.predict(scaled.test().features())?)?;
    let linear_cv = cross_validate(make_linear, &dataset, &cv)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run("Fitting random forest");
    let start = Instant::now();
    let mut forest = make_forest();
    forest.fit(scaled.train().features(), scaled.train().targets())?;
    let forest_metrics =
        RegressionMetrics::compute(scaled.test().targets(), &forest.predict(scaled.test().features())?)?;
    let forest_cv = cross_validate(make_forest, &dataset, &cv)?;
    step_done(&format!("{:?}", start.elapsed()));

    section("Test set");
    println!(
        "  {:<20} {:>10} {:>10} {:>10} {:>10}",
        muted("Model"),
        muted("R²"),
        muted("MSE"),
        muted("RMSE"),
        muted("MAE")
    );
    println!("  {}", dim(&"─".repeat(64)));
    print_metrics("Linear Regression", &linear_metrics);
    print_metrics("Random Forest", &forest_metrics);

    section(&format!("{}-fold cross-validation", cv_folds));
    println!(
        "  {:<20} {:>16} {:>20}",
        muted("Model"),
        muted("R² (mean ± std)"),
        muted("MSE (mean ± std)")
    );
    println!("  {}", dim(&"─".repeat(58)));
    for (name, results) in [("Linear Regression", &linear_cv), ("Random Forest", &forest_cv)] {
        println!(
            "  {:<20} {:>8.4} ± {:<6.4} {:>10.4} ± {:<6.4}",
            name, results.mean_r2, results.std_r2, results.mean_mse, results.std_mse
        );
    }

    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path, target: Option<&str>) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_data(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));

    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    if let Some(target) = target {
        let series = df.column(target)?.as_materialized_series().cast(&DataType::Float64)?;
        let values = series.f64()?;
        section(&format!("Target: {}", target));
        let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
        kv("Count", &(values.len() - values.null_count()).to_string());
        kv("Mean", &show(values.mean()));
        kv("Std", &show(values.std(0)));
        kv("Min", &show(values.min()));
        kv("Max", &show(values.max()));
    }

    println!();
    Ok(())
}
