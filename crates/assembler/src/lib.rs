//! Two-pass assembler for an AArch64 integer subset.
//!
//! Encoders build the instruction payload types of `a64-core`, the same types
//! its decoder produces, so assembled words and decoded words agree on every
//! bit field.

/// Alias rewriting to canonical operand lists.
pub mod alias;
/// Top-level two-pass assembler pipeline.
pub mod assembler;
/// Instruction and directive encoding.
pub mod encoder;
/// Line tokenizer and label splitting.
pub mod lexer;
/// Mnemonic resolution.
pub mod mnemonic;
/// Operand parsing.
pub mod operand;
/// Symbol table and pass-1 address assignment.
pub mod symbols;

pub use assembler::{assemble, assemble_file, AssembleError, AssembleResult, ListingEntry};
pub use encoder::{EncodeError, EncodeErrorKind};
pub use symbols::{SymbolError, SymbolErrorKind, SymbolTable};

// Used by the `a64-asm` binary.
use anyhow as _;
use clap as _;
use tracing_subscriber as _;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
