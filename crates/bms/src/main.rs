//! BMS
//!
//! Loads a building save file, optionally simulates it for a number of
//! minutes, and prints a status report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bms::config::{BmsConfig, LoggingConfig, OutputFormat};
use bms::savefile::{SaveFileLoader, SaveFileWriter};
use bms::simulation::Simulation;

/// Building Management System
#[derive(Parser, Debug)]
#[command(name = "bms")]
#[command(about = "Building management system save-file tool", long_about = None)]
struct Args {
    /// Path to the save file to load
    save_file: PathBuf,

    /// Path to a bms.toml configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated minutes to run before reporting
    #[arg(short, long)]
    minutes: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write the buildings back out to this save file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Include a study-room recommendation for each building
    #[arg(long)]
    recommend: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BmsConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BmsConfig::default(),
    };

    init_tracing(&config.logging);
    info!("Starting bms v{}", env!("CARGO_PKG_VERSION"));

    let buildings = SaveFileLoader::load(&args.save_file)
        .await
        .with_context(|| format!("Failed to load buildings from {}", args.save_file.display()))?;

    let mut simulation = Simulation::new(buildings);
    simulation.run(args.minutes.unwrap_or(config.simulation.minutes));

    let report = simulation.report(args.recommend);
    let format = if args.json {
        OutputFormat::Json
    } else {
        config.output.format
    };
    match format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.save {
        SaveFileWriter::save(path, simulation.buildings())
            .await
            .with_context(|| format!("Failed to save buildings to {}", path.display()))?;
    }

    Ok(())
}

/// Logs go to stderr so reports on stdout stay clean. `RUST_LOG` wins over
/// the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(logging.json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!logging.json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}
