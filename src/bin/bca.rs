use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use bca_assay::logbook::{write_logbook, write_points_csv};
use bca_assay::{loader, quantify, Config, Result};
use clap::Parser;
use log::{info, LevelFilter};

/// Quantify protein samples against a BCA/Bradford standard curve
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// CSV table with one column per channel (Blank, standards and samples)
    table: PathBuf,

    /// TOML file describing the blank, the standard series and the sample prefix
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the logbook here instead of to stdout
    #[arg(short, long)]
    logbook: Option<PathBuf>,

    /// Export the calibration points and fitted line as CSV
    #[arg(short, long)]
    points: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<()> {
    let config: Config<f64> = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let table = loader::from_file::<f64>(&cli.table)?;
    let report = quantify(&table, &config)?;

    match &cli.logbook {
        Some(path) => {
            write_logbook(&report, BufWriter::new(File::create(path)?))?;
            info!("logbook written to {path:?}");
        }
        None => write_logbook(&report, io::stdout().lock())?,
    }

    if let Some(path) = &cli.points {
        write_points_csv(&report, BufWriter::new(File::create(path)?))?;
        info!("calibration points written to {path:?}");
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
