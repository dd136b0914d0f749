// ABOUTME: Pierre workout CLI - aggregates a JSON workout fixture and prints the results
// ABOUTME: Prints summaries, minute rows, and zone times as JSON or exports rows as CSV
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Whole-workout summary as JSON
//! pierre-workout summary run.json
//!
//! # Summary without minute detail
//! pierre-workout summary run.json --quick
//!
//! # Minute rows as JSON
//! pierre-workout rows run.json
//!
//! # Minute rows as CSV
//! pierre-workout csv run.json > run.csv
//!
//! # Time in heart-rate zones
//! pierre-workout zones run.json --max-heart-rate 190
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pierre_workout::config::EngineConfig;
use pierre_workout::export::{write_csv, write_summary_csv};
use pierre_workout::logging;
use pierre_workout::synthetic::{SyntheticSource, WorkoutFixture};
use pierre_workout::workout::{LoadState, WorkoutAggregator, WorkoutConfig, WorkoutReport};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "pierre-workout",
    about = "Pierre workout aggregation CLI",
    long_about = "Aggregates a recorded workout into a summary, minute-by-minute rows, and heart-rate zone times."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct WorkoutArgs {
    /// Path to a JSON workout fixture
    fixture: PathBuf,

    /// Only load what the summary needs, skipping minute detail
    #[arg(long)]
    quick: bool,

    /// Maximum heart rate in bpm for zone times
    #[arg(long)]
    max_heart_rate: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the whole-workout summary as JSON
    Summary {
        #[command(flatten)]
        workout: WorkoutArgs,

        /// Print CSV instead of JSON
        #[arg(long)]
        csv: bool,
    },
    /// Print the minute rows and pause markers as JSON
    Rows {
        #[command(flatten)]
        workout: WorkoutArgs,
    },
    /// Export the minute rows as CSV
    Csv {
        #[command(flatten)]
        workout: WorkoutArgs,
    },
    /// Print time spent in each heart-rate zone as JSON
    Zones {
        #[command(flatten)]
        workout: WorkoutArgs,
    },
}

async fn load(args: &WorkoutArgs) -> Result<WorkoutReport> {
    let fixture = WorkoutFixture::from_path(&args.fixture)
        .with_context(|| format!("failed to load fixture {}", args.fixture.display()))?;

    let mut config = WorkoutConfig::for_activity(fixture.activity);
    EngineConfig::from_env().apply_to(&mut config);
    if let Some(max_heart_rate) = args.max_heart_rate.or(fixture.max_heart_rate) {
        config = config.with_max_heart_rate(max_heart_rate);
    }

    let source = Arc::new(SyntheticSource::from_fixture(&fixture)?);
    let workout = WorkoutAggregator::new(fixture.definition(), config, source)?;
    let state = workout.load_and_wait(args.quick).await;
    if state == LoadState::Unavailable {
        bail!("health data source is unavailable");
    }

    let report = workout.report().await?;
    info!(
        workout.id = %report.summary.id,
        rows = report.row_count(),
        has_error = report.has_error(),
        "Workout aggregated"
    );
    Ok(report)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_from_env()?;

    match cli.command {
        Command::Summary { workout, csv } => {
            let report = load(&workout).await?;
            if csv {
                write_summary_csv(&report, io::stdout().lock())?;
            } else {
                print_json(&report.summary)?;
            }
        }
        Command::Rows { workout } => {
            let report = load(&workout).await?;
            print_json(&report.rows)?;
        }
        Command::Csv { workout } => {
            let report = load(&workout).await?;
            write_csv(&report, io::stdout().lock())?;
        }
        Command::Zones { workout } => {
            let report = load(&workout).await?;
            print_json(&report.summary.zones)?;
        }
    }
    Ok(())
}
