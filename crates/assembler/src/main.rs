//! CLI entry point for the assembler binary.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use a64_asm::{assemble_file, AssembleResult};
use a64_core as _;
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
    about = "Assemble AArch64 source into a flat little-endian binary image"
)]
struct Opts {
    /// Assembly source file.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Binary image to write.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    /// Print an address/word/source listing to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn print_listing(result: &AssembleResult) {
    for entry in &result.listing {
        eprintln!("{:08x}: {:08x}  {}", entry.address, entry.word, entry.source);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let result = assemble_file(&opts.input)
        .with_context(|| format!("failed to assemble '{}'", opts.input.display()))?;

    fs::write(&opts.output, &result.binary)
        .with_context(|| format!("failed to write output file '{}'", opts.output.display()))?;

    if opts.verbose {
        print_listing(&result);
    }

    println!(
        "Assembled {} ({} bytes) -> {}",
        opts.input.display(),
        result.binary.len(),
        opts.output.display()
    );
    Ok(())
}
