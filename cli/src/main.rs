//! agreement-schedule - compute payment schedules from a document snapshot
//!
//! Reads a JSON array of agreement documents, runs the schedule engine and
//! writes a `BatchSnapshot` as JSON. Logs go to stderr (`RUST_LOG`, default
//! `info`) so stdout carries only the output document.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use agreement_schedule_core_rs::{BatchSnapshot, EngineConfig, ScheduleEngine, ScheduleError};
use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "agreement-schedule", version, about = "Compute land agreement payment schedules")]
struct Cli {
    /// JSON array of agreement documents
    #[arg(long, short)]
    input: PathBuf,

    /// JSON engine config; defaults apply to omitted fields
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] ScheduleError),
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json(&read(path)?)?,
        None => EngineConfig::default(),
    };
    let engine = ScheduleEngine::new(config)?;

    let documents = read(&cli.input)?;
    let schedules = engine.compute_batch_json(&documents)?;
    let payments: usize = schedules.iter().map(|s| s.all_payments().len()).sum();
    info!(schedules = schedules.len(), payments, "schedules computed");

    let snapshot = BatchSnapshot::new(engine.config(), schedules)?;
    let json = snapshot.to_json(cli.pretty)?;
    match &cli.output {
        Some(path) => fs::write(path, json).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?,
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
