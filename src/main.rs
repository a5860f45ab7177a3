//! solsweep - Main Entry Point
//!
//! Hyperparameter sweeps for solubility regression from the command line.

use clap::Parser;
use solsweep::cli::{cmd_compare, cmd_info, cmd_sweep, Cli, Commands, SweepArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solsweep=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sweep {
            data,
            target,
            id_column,
            features,
            trees,
            depths,
            test_fraction,
            seed,
            jobs,
            config,
            output,
        } => {
            let args = SweepArgs {
                target,
                id_column,
                features,
                trees,
                depths,
                test_fraction,
                seed,
                jobs,
                config,
                output,
            };
            cmd_sweep(&data, &args)?;
        }
        Commands::Compare {
            data,
            target,
            id_column,
            features,
            test_fraction,
            cv_folds,
            seed,
        } => {
            cmd_compare(
                &data,
                &target,
                id_column.as_deref(),
                features.as_deref(),
                test_fraction,
                cv_folds,
                seed,
            )?;
        }
        Commands::Info { data, target } => {
            cmd_info(&data, target.as_deref())?;
        }
    }

    Ok(())
}
