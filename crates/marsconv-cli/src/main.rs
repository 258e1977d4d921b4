//! Command-line interface for `marsconv`, a WGS84 <-> GCJ-02 dataset
//! conversion tool.
//!
//! This binary provides a user-friendly CLI to interact with the
//! [`marsconv_core`] library, converting the geometry of every feature in a
//! vector dataset between the two datums while replicating the attribute
//! schema and values unchanged.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for
//! structured logging; `log` records emitted by the core crate are bridged
//! through [`tracing_log::LogTracer`]. Command handlers delegate to the
//! core pipeline and render results with the [`display`] module.
//!
//! # Available Commands
//!
//! - `convert` - Convert a dataset between the two datums
//! - `info` - Display dataset schema and metadata

mod display;

use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use marsconv_core::error::{MarsconvError, Result};
use marsconv_core::pipeline::convert_dataset_files;
use marsconv_core::store::geojson::GeoJsonSource;

#[derive(Parser)]
#[command(
    name = "marsconv",
    version,
    about = "WGS84 <-> GCJ-02 datum conversion for vector datasets",
    long_about = "marsconv converts the geometry of every feature in a vector dataset\n\
                  between the WGS84 and GCJ-02 datums, keeping the attribute schema\n\
                  and values identical. The reverse direction is an approximation."
)]
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `marsconv` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Converts a dataset between the WGS84 and GCJ-02 datums.
    ///
    /// Reads every feature from the input dataset, transforms its geometry
    /// in the requested direction, and writes the successes to the output
    /// dataset in input order. Records with unsupported or malformed
    /// geometry are skipped with a warning; they never abort the run.
    Convert {
        /// Path to the input dataset.
        #[arg(short, long, value_name = "DATASET")]
        input: String,

        /// Path for the output dataset. Always declared in WGS84
        /// (EPSG:4326) regardless of direction.
        #[arg(short, long, value_name = "DATASET")]
        output: String,

        /// Conversion direction: WGS84_TO_GCJ02 or GCJ02_TO_WGS84.
        #[arg(long, value_name = "DIRECTION")]
        direction: String,
    },

    /// Displays schema and metadata of a dataset.
    Info {
        /// Path to the input dataset.
        #[arg(value_name = "DATASET")]
        input: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    if let Err(err) = init_logging(log_level) {
        eprintln!("{}", err.user_message());
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            direction,
        } => handle_convert(&input, &output, &direction),
        Commands::Info { input } => handle_info(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.user_message());
            if let Some(hint) = err.recovery_suggestion() {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        },
    }
}

fn init_logging(log_level: Level) -> Result<()> {
    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init().map_err(|e| MarsconvError::Other(anyhow!(e)))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true) // Show module paths for better context
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| MarsconvError::Other(anyhow!(e)))?;
    Ok(())
}

fn handle_convert(input: &str, output: &str, direction: &str) -> Result<()> {
    info!("converting {input} to {output} ({direction})");
    let report = convert_dataset_files(input, output, direction)?;
    display::display_report(&report);
    Ok(())
}

fn handle_info(input: &str) -> Result<()> {
    let source = GeoJsonSource::open(input)?;
    display::display_dataset_info(&source.describe());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("in.geojson");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn handle_convert_rejects_bad_direction() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(
            &dir,
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[116.0,39.0]},"properties":{}}"#,
        );
        let output = dir.path().join("out.geojson");
        let err = handle_convert(
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "NOT_A_DIRECTION",
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a conversion direction"));
        assert!(!output.exists());
    }

    #[test]
    fn handle_convert_round_trips_a_point() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(
            &dir,
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[116.3975,39.9087]},"properties":{"id":1}}"#,
        );
        let output = dir.path().join("out.geojson");
        handle_convert(
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "WGS84_TO_GCJ02",
        )
        .unwrap();
        assert!(output.exists());
    }

    #[test]
    fn handle_info_reports_missing_dataset() {
        let err = handle_info("definitely/not/here.geojson").unwrap_err();
        assert!(err.user_message().contains("not found"));
    }
}
