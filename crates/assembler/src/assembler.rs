//! Top-level assembler pipeline.
//!
//! 1. **Parse**: every line is tokenized, its labels split off, its mnemonic
//!    resolved and its operands parsed. Any failure aborts here, so both
//!    passes see the same set of emitting lines.
//! 2. **Pass 1**: address assignment and symbol table construction
//!    ([`assign_addresses`]).
//! 3. **Pass 2**: encoding to little-endian words ([`encode_line`]).
//!
//! The first error aborts the whole assembly; no partial image is produced.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::encoder::{encode_line, EncodeContext, EncodeError};
use crate::lexer::{strip_comment, SourceLine, Token};
use crate::mnemonic::{resolve_mnemonic, Mnemonic};
use crate::operand::{parse_operands, Operand, OperandError};
use crate::symbols::{assign_addresses, LineShape, SymbolError, SymbolTable};

/// Assembly failure.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The first word of a statement is not a known mnemonic or directive.
    #[error("line {line}: unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic {
        /// Text as written.
        mnemonic: String,
        /// Source line.
        line: usize,
    },
    /// Operand syntax error.
    #[error("line {line}: {source}")]
    Operand {
        /// Underlying parse error.
        source: OperandError,
        /// Source line.
        line: usize,
    },
    /// Label definition error from pass 1.
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    /// Encoding error from pass 2.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl AssembleError {
    /// Source line the error refers to, if any.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownMnemonic { line, .. } | Self::Operand { line, .. } => Some(*line),
            Self::Symbol(err) => Some(err.line),
            Self::Encode(err) => Some(err.line),
            Self::Io { .. } => None,
        }
    }
}

/// An entry in the address-to-source listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Address of the word.
    pub address: u32,
    /// Encoded word.
    pub word: u32,
    /// Source text with labels and comment stripped.
    pub source: String,
    /// 1-indexed source line.
    pub line: usize,
}

/// Output of a successful assembly.
#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// Flat little-endian image, one word per statement.
    pub binary: Vec<u8>,
    /// One entry per emitted word, in address order.
    pub listing: Vec<ListingEntry>,
    /// Labels defined by the program.
    pub symbols: SymbolTable,
}

impl AssembleResult {
    /// Emitted words in address order.
    #[must_use]
    pub fn words(&self) -> Vec<u32> {
        self.listing.iter().map(|entry| entry.word).collect()
    }
}

#[derive(Debug)]
struct Statement {
    mnemonic: Mnemonic,
    operands: Vec<Operand>,
    text: String,
}

#[derive(Debug)]
struct ParsedLine {
    number: usize,
    labels: Vec<String>,
    statement: Option<Statement>,
}

fn parse_line(line: SourceLine) -> Result<ParsedLine, AssembleError> {
    let statement = match line.body.split_first() {
        None => None,
        Some((head, rest)) => {
            let mnemonic = match head {
                Token::Word(name) => resolve_mnemonic(name),
                _ => None,
            }
            .ok_or_else(|| AssembleError::UnknownMnemonic {
                mnemonic: head.text().to_string(),
                line: line.number,
            })?;
            let operands = parse_operands(rest).map_err(|source| AssembleError::Operand {
                source,
                line: line.number,
            })?;
            Some(Statement {
                mnemonic,
                operands,
                text: statement_text(&line),
            })
        }
    };
    Ok(ParsedLine {
        number: line.number,
        labels: line.labels,
        statement,
    })
}

/// Line text after the leading label declarations, without its comment.
fn statement_text(line: &SourceLine) -> String {
    let mut rest = strip_comment(&line.text).trim_start();
    for label in &line.labels {
        rest = rest
            .strip_prefix(label.as_str())
            .and_then(|after| after.strip_prefix(':'))
            .unwrap_or(rest)
            .trim_start();
    }
    rest.trim_end().to_string()
}

/// Assembles source text into a flat little-endian image.
///
/// # Errors
///
/// Returns the first [`AssembleError`] encountered: an unknown mnemonic or
/// malformed operand while parsing, a duplicate or invalid label in pass 1,
/// or an encoding failure such as an undefined label or an out-of-range
/// immediate in pass 2.
#[allow(clippy::cast_possible_truncation)]
pub fn assemble(source: &str) -> Result<AssembleResult, AssembleError> {
    let lines = source
        .lines()
        .enumerate()
        .map(|(index, text)| parse_line(SourceLine::parse(text, index + 1)))
        .collect::<Result<Vec<_>, _>>()?;

    let assignment = assign_addresses(lines.iter().map(|line| LineShape {
        line: line.number,
        labels: &line.labels,
        emits: line.statement.is_some(),
    }))?;

    let mut binary = Vec::with_capacity(assignment.end_address as usize);
    let mut listing = Vec::new();
    for (line, &address) in lines.iter().zip(&assignment.addresses) {
        let Some(statement) = &line.statement else {
            continue;
        };
        let ctx = EncodeContext {
            address,
            symbols: &assignment.symbols,
        };
        let word = encode_line(statement.mnemonic, &statement.operands, &ctx, line.number)?;
        binary.extend_from_slice(&word.to_le_bytes());
        listing.push(ListingEntry {
            address,
            word,
            source: statement.text.clone(),
            line: line.number,
        });
    }

    tracing::debug!(
        words = listing.len(),
        bytes = binary.len(),
        "pass 2 encoded program"
    );
    Ok(AssembleResult {
        binary,
        listing,
        symbols: assignment.symbols,
    })
}

/// Reads and assembles a source file.
///
/// # Errors
///
/// Returns [`AssembleError::Io`] if the file cannot be read, otherwise as
/// [`assemble`].
pub fn assemble_file(path: &Path) -> Result<AssembleResult, AssembleError> {
    let source = fs::read_to_string(path).map_err(|source| AssembleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "assembling");
    assemble(&source)
}

#[cfg(test)]
mod tests {
    use super::{assemble, assemble_file, AssembleError};
    use crate::encoder::EncodeErrorKind;
    use crate::symbols::SymbolErrorKind;
    use a64_core::{run, CoreConfig, CoreState, NullMmio, Pstate, Register, StopReason};
    use std::fs;

    fn reg(index: u8) -> Register {
        Register::new(index).expect("valid register")
    }

    #[test]
    fn empty_source_assembles_to_nothing() {
        let result = assemble("").expect("assembles");
        assert!(result.binary.is_empty());
        assert!(result.listing.is_empty());
        assert!(result.symbols.is_empty());
    }

    #[test]
    fn moves_and_add_run_to_expected_state() {
        let result = assemble("mov x0, #5\nmov x1, x0\nadd x2, x0, x1\n").expect("assembles");
        assert_eq!(result.words(), vec![0xD280_00A0, 0xAA00_03E1, 0x8B01_0002]);
        assert_eq!(
            result.binary,
            vec![0xA0, 0x00, 0x80, 0xD2, 0xE1, 0x03, 0x00, 0xAA, 0x02, 0x00, 0x01, 0x8B]
        );

        let (mut state, _) = CoreState::with_image(&result.binary);
        run(&mut state, &mut NullMmio, &CoreConfig::default());
        assert_eq!(state.arch.x(reg(0)), 5);
        assert_eq!(state.arch.x(reg(1)), 5);
        assert_eq!(state.arch.x(reg(2)), 10);
        assert_eq!(state.arch.pc(), 12);
        assert_eq!(state.arch.pstate(), Pstate::default());
    }

    #[test]
    fn forward_conditional_branch_resolves() {
        let source = "\
    cmp x0, x0
    b.eq skip
    mov x1, #1
skip:
    and x0, x0, x0
";
        let result = assemble(source).expect("assembles");
        assert_eq!(result.words()[1], 0x5400_0040);
        assert_eq!(result.symbols.address_of("skip"), Some(12));

        let (mut state, _) = CoreState::with_image(&result.binary);
        let outcome = run(&mut state, &mut NullMmio, &CoreConfig::default());
        assert_eq!(outcome.stop, StopReason::Halted);
        assert_eq!(state.arch.x(reg(1)), 0);
    }

    #[test]
    fn countdown_loop_with_backward_branch() {
        let source = "\
        movz x0, #3       // counter
loop:   subs x0, x0, #1
        b.ne loop
        and x0, x0, x0
";
        let result = assemble(source).expect("assembles");
        assert_eq!(
            result.words(),
            vec![0xD280_0060, 0xF100_0400, 0x54FF_FFE1, 0x8A00_0000]
        );
        assert_eq!(result.listing[1].source, "subs x0, x0, #1");
        assert_eq!(result.listing[1].line, 2);
        assert_eq!(result.listing[1].address, 4);
    }

    #[test]
    fn listing_strips_every_leading_label() {
        let source = "ab: b: mov x0, #1 // set\ntop: again: b again\n";
        let result = assemble(source).expect("assembles");
        assert_eq!(result.listing[0].source, "mov x0, #1");
        assert_eq!(result.listing[1].source, "b again");
        assert_eq!(result.symbols.address_of("b"), Some(0));
        assert_eq!(result.symbols.address_of("again"), Some(4));
    }

    #[test]
    fn literal_pool_and_int_directive() {
        let source = "\
    ldr x0, value
    and x0, x0, x0
value:
    .int 0x1234
    .int 0
";
        let result = assemble(source).expect("assembles");
        assert_eq!(result.words(), vec![0x5800_0040, 0x8A00_0000, 0x1234, 0]);

        let (mut state, _) = CoreState::with_image(&result.binary);
        run(&mut state, &mut NullMmio, &CoreConfig::default());
        assert_eq!(state.arch.x(reg(0)), 0x1234);
    }

    #[test]
    fn label_only_lines_take_no_space() {
        let result = assemble("start:\n\n// comment\nend: b start\n").expect("assembles");
        assert_eq!(result.symbols.address_of("start"), Some(0));
        assert_eq!(result.symbols.address_of("end"), Some(0));
        assert_eq!(result.words(), vec![0x1400_0000]);
    }

    #[test]
    fn unknown_mnemonic_aborts_before_encoding() {
        let err = assemble("mov x0, #1\nfrob x0\nb nowhere\n").expect_err("fails");
        assert!(matches!(
            &err,
            AssembleError::UnknownMnemonic { mnemonic, line: 2 } if mnemonic == "frob"
        ));
        assert_eq!(err.to_string(), "line 2: unknown mnemonic 'frob'");
    }

    #[test]
    fn malformed_operands_report_their_line() {
        let err = assemble("ldr x0, [x1, #8\n").expect_err("fails");
        assert!(matches!(err, AssembleError::Operand { line: 1, .. }));
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn undefined_label_is_a_hard_error() {
        let err = assemble("b.eq missing\n").expect_err("fails");
        let AssembleError::Encode(encode) = err else {
            panic!("expected encode error, got {err:?}");
        };
        assert_eq!(encode.line, 1);
        assert_eq!(
            encode.kind,
            EncodeErrorKind::UndefinedLabel("missing".to_string())
        );
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let err = assemble("a: mov x0, #1\na: mov x0, #2\n").expect_err("fails");
        let AssembleError::Symbol(symbol) = err else {
            panic!("expected symbol error, got {err:?}");
        };
        assert_eq!(symbol.line, 2);
        assert!(matches!(symbol.kind, SymbolErrorKind::DuplicateLabel { .. }));
    }

    #[test]
    fn assemble_file_reads_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prog.s");
        fs::write(&path, "movz x0, #5\n").expect("write source");
        let result = assemble_file(&path).expect("assembles");
        assert_eq!(result.words(), vec![0xD280_00A0]);

        let missing = assemble_file(&dir.path().join("missing.s")).expect_err("fails");
        assert!(matches!(missing, AssembleError::Io { .. }));
        assert_eq!(missing.line(), None);
    }
}
