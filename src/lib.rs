//! Framecheck: a validator for checksummed, length-framed record files.
//!
//! Record files (the TFRecord framing) are a plain sequence of frames, each a
//! little-endian length, a masked CRC-32C of that length, an opaque payload and
//! a masked CRC-32C of the payload. Framecheck walks such files frame by frame
//! and reports, per record, whether framing and payload are intact.
//!
//! # Modules
//!
//! - [`checksum`]: Masked CRC-32C used by the wire format
//! - [`frame`]: Frame layout, the shared framing parser, and the encoder
//! - [`reader`]: Checksum-verifying reader and the structural fast path
//! - [`validation`]: Multi-input runs, summaries and reports
//! - [`error`]: Error types for framecheck operations

pub mod checksum;
pub mod error;
pub mod frame;
pub mod reader;
pub mod validation;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use checksum::masked_crc32c;
pub use error::FramecheckError;
pub use frame::{encode_frame, Frame, FrameError, RecordWriter};
pub use reader::{iterate_structural, CheckedFrame, RecordReader, ValidationOutcome};
pub use validation::{validate, Input, RunReport, RunSummary, ValidateOptions, ValidationMode};

/// The framecheck CLI application.
#[derive(Parser)]
#[command(name = "framecheck")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log verbosity on stderr (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn", env = "FRAMECHECK_LOG_LEVEL")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate one or more record files.
    Validate(ValidateArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Record files to validate. Directories are searched recursively.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Only check that frames are consumable; skip checksum verification.
    #[arg(long)]
    structural: bool,

    /// When expanding directories, keep only files with this extension.
    #[arg(long)]
    extension: Option<String>,

    /// Stop each input after this many records. A stopped input is reported
    /// as not fully checked and fails the run.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_records: Option<u64>,

    /// Inputs validated in parallel (0 = one per CPU).
    #[arg(long, default_value_t = 1, env = "FRAMECHECK_JOBS")]
    jobs: usize,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the framecheck CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), FramecheckError> {
    let cli = Cli::parse();

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("framecheck {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Validator for checksummed, length-framed record files.");
            println!();
            println!("Run 'framecheck --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), FramecheckError> {
    let output = args.output.as_str();
    if !matches!(output, "text" | "json") {
        return Err(FramecheckError::UnsupportedOutput(format!(
            "'{}' (supported: text, json)",
            output
        )));
    }

    let inputs = validation::expand_paths(&args.inputs, args.extension.as_deref());
    if inputs.is_empty() {
        return Err(FramecheckError::NoInputs);
    }

    let opts = ValidateOptions {
        mode: if args.structural {
            ValidationMode::Structural
        } else {
            ValidationMode::Checksums
        },
        max_records: args.max_records,
        jobs: args.jobs,
    };
    let report = RunReport::new(opts.mode, validate(&inputs, &opts));

    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", report),
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(FramecheckError::ValidationFailed {
            failed_inputs: report.totals.failed_inputs,
            total_inputs: report.totals.inputs,
            report: Box::new(report),
        })
    }
}
