//! icopdf
//!
//! Writes a file that is an ICO icon and a PDF document at the same time.
//!
//! ```text
//! icopdf [-v] [--force] [--json] [--verify] ICO PDF OUTPUT
//! ```
//!
//! Exit codes: 0 success, 1 I/O or usage, 2 malformed input,
//! 3 unsupported PDF, 4 too many images, 5 output too large,
//! 6 offset overflow.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use icopdf_core::{build_polyglot, verify_polyglot, PolyglotError};
use tracing::{debug, error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "icopdf")]
#[command(version, about = "Create files that are valid ICO images and PDF documents")]
struct Args {
    /// Input icon
    ico: PathBuf,

    /// Input PDF (classic xref table, single section)
    pdf: PathBuf,

    /// Output file
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Overwrite OUTPUT if it already exists
    #[arg(long)]
    force: bool,

    /// Print the build report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Re-read the result as ICO and PDF before writing it
    #[arg(long)]
    verify: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // stdout is reserved for --json
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    debug!(?args, "starting");

    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    let ico = fs::read(&args.ico)
        .with_context(|| format!("Error opening ico file {}", args.ico.display()))?;
    let pdf = fs::read(&args.pdf)
        .with_context(|| format!("Error opening pdf file {}", args.pdf.display()))?;

    let polyglot = build_polyglot(&ico, &pdf)?;

    if args.verify {
        let checked = verify_polyglot(&polyglot.bytes)?;
        info!(
            objects = checked.objects_checked,
            pdf_offset = checked.pdf_offset,
            "output verified"
        );
    }

    write_output(args, &polyglot.bytes)?;

    if args.json {
        println!("{}", polyglot.report.to_json()?);
    } else {
        info!("{}", polyglot.report);
        info!("Output file successfully written to {}", args.output.display());
    }

    Ok(())
}

fn write_output(args: &Args, bytes: &[u8]) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .create_new(!args.force)
        .open(&args.output)
        .with_context(|| format!("Error opening output file {}", args.output.display()))?;

    file.write_all(bytes)
        .with_context(|| format!("Error writing file {}", args.output.display()))?;
    Ok(())
}

/// Process exit code for a failed run
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PolyglotError>() {
        Some(PolyglotError::Format(_)) => 2,
        Some(PolyglotError::UnsupportedFormat(_)) => 3,
        Some(PolyglotError::TooManySubImages { .. }) => 4,
        Some(PolyglotError::FileTooLarge { .. }) => 5,
        Some(PolyglotError::OffsetOverflow { .. }) => 6,
        None => 1,
    }
}
