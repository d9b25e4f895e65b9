//! peek-sim CLI
//!
//! Sample sizing and peeking simulations from the command line.
//! Tables go to stdout, logs to stderr.

mod cli;
mod logging;
mod render;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use peek_core::{calculate_sample_size, run_report, ExperimentConfig, TestConfig};
use serde::Serialize;
use tracing::info;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::SampleSize { test, days } => {
            let mut config = TestConfig::default();
            test.apply(&mut config);
            config.validate()?;

            let sizes = calculate_sample_size(&config.sample_size_request())?;
            let daily = match days {
                Some(days) => Some((days, sizes.daily_allocation(days)?)),
                None => None,
            };
            print!("{}", render::render_sample_size(&config, &sizes, daily));
        }

        Commands::Simulate {
            config,
            test,
            simulation,
            report_json,
            trajectories_json,
        } => {
            let mut experiment = match &config {
                Some(path) => ExperimentConfig::from_path(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ExperimentConfig::default(),
            };
            test.apply(&mut experiment.test);
            simulation.apply(&mut experiment);

            info!(
                simulations = experiment.simulation.num_simulations,
                days = experiment.test.test_days,
                seed = experiment.simulation.seed,
                "Running simulation"
            );
            let (report, trajectories) = run_report(&experiment)?;
            print!("{}", render::render_report(&report));

            if let Some(path) = report_json {
                write_json(&path, &report)?;
            }
            if let Some(path) = trajectories_json {
                write_json(&path, &trajectories)?;
            }
        }
    }

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "JSON written");
    Ok(())
}
