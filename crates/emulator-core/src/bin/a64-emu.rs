//! CLI entry point for the emulator binary.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use a64_core::{
    disassemble_image, format_final_state, run, CoreConfig, CoreState, FaultClass, GpioPeripheral,
    MmioBus, NullMmio, StopReason, MEMORY_SIZE,
};
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing as _;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run a flat AArch64 binary image and dump the final machine state"
)]
struct Opts {
    /// Raw little-endian image loaded at address 0.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Write the final-state dump here instead of stdout.
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Stop after this many executed instructions.
    #[arg(long, value_name = "N")]
    step_limit: Option<u64>,
    /// Discard stores to the GPIO window instead of driving pins.
    #[arg(long)]
    no_gpio: bool,
    /// Print a listing of the image instead of running it.
    #[arg(long)]
    disassemble: bool,
}

fn listing(image: &[u8]) -> String {
    disassemble_image(image)
        .iter()
        .map(|row| format!("{:08x}: {:08x}  {}\n", row.addr, row.raw_word, row.text()))
        .collect()
}

fn emit(output: Option<&PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write output file '{}'", path.display())),
        None => std::io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .context("failed to write to stdout"),
    }
}

fn execute(opts: &Opts) -> Result<StopReason> {
    let image = fs::read(&opts.input)
        .with_context(|| format!("failed to read input file '{}'", opts.input.display()))?;

    if opts.disassemble {
        let end = image.len().min(MEMORY_SIZE);
        emit(opts.output.as_ref(), &listing(&image[..end]))?;
        return Ok(StopReason::Halted);
    }

    let (mut state, _) = CoreState::with_image(&image);

    let config = CoreConfig {
        step_limit: opts.step_limit,
        ..CoreConfig::default()
    };
    let mut gpio = GpioPeripheral::new();
    let mut null = NullMmio;
    let bus: &mut dyn MmioBus = if opts.no_gpio { &mut null } else { &mut gpio };
    let outcome = run(&mut state, bus, &config);

    emit(opts.output.as_ref(), &format_final_state(&state))?;
    Ok(outcome.stop)
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    match execute(&opts)? {
        StopReason::Fault(cause) if cause.class() == FaultClass::Fetch => {
            eprintln!("emulation stopped: {cause}");
            Ok(ExitCode::from(cause.as_u8()))
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}
