//! Instruction and directive encoding (pass 2).
//!
//! Every family encoder packs its fields through the instruction payload
//! types of `a64-core`, the same types the decoder produces, so encoded words
//! always decode back to the operands that were written.

mod branch;
mod data_processing;
mod directive;
mod transfer;

pub use branch::{encode_branch, encode_branch_conditional, encode_branch_register};
pub use data_processing::{
    encode_arithmetic, encode_logical, encode_multiply, encode_wide_move,
};
pub use directive::encode_int;
pub use transfer::encode_transfer;

use a64_core::fits_signed;
use thiserror::Error;

use crate::alias::expand_alias;
use crate::mnemonic::Mnemonic;
use crate::operand::{Operand, OperandError, RegOperand};
use crate::symbols::SymbolTable;

/// Error during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct EncodeError {
    /// Kind of error.
    pub kind: EncodeErrorKind,
    /// Source line where the error occurred.
    pub line: usize,
}

/// Classification of encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeErrorKind {
    /// Operands of the wrong shape.
    #[error(transparent)]
    Operand(#[from] OperandError),
    /// Label reference with no definition.
    #[error("undefined label '{0}'")]
    UndefinedLabel(String),
    /// Immediate outside its field.
    #[error("immediate {value} does not fit the {bits}-bit field")]
    ImmediateOutOfRange {
        /// Value as written.
        value: i64,
        /// Field width.
        bits: u32,
    },
    /// Unsigned load/store offset that is not a multiple of the access size.
    #[error("offset {offset} is not a multiple of the {scale}-byte access size")]
    UnalignedOffset {
        /// Byte offset as written.
        offset: i64,
        /// Access size in bytes.
        scale: u64,
    },
    /// PC-relative offset that is not word aligned.
    #[error("offset {0} is not a multiple of 4")]
    MisalignedOffset(i64),
    /// PC-relative offset outside the signed word-offset field.
    #[error("offset {offset} is out of range for a {bits}-bit word offset")]
    OffsetOutOfRange {
        /// Byte offset.
        offset: i64,
        /// Field width in words.
        bits: u32,
    },
    /// Shift kind or amount not accepted by the instruction.
    #[error("invalid shift '{kind} #{amount}'")]
    InvalidShift {
        /// Shift mnemonic.
        kind: &'static str,
        /// Amount as written.
        amount: i64,
    },
    /// Register views that disagree, or a W register where an X is required.
    #[error("register '{0}' has the wrong width")]
    WidthMismatch(String),
    /// `str` with a PC-relative literal address.
    #[error("stores cannot use a literal address")]
    StoreLiteral,
    /// Addressing syntax that no load/store form accepts.
    #[error("unsupported addressing form: {0}")]
    UnsupportedAddressing(&'static str),
}

/// Pass-2 state an encoder may consult.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    /// Address of the word being encoded.
    pub address: u32,
    /// Labels collected in pass 1.
    pub symbols: &'a SymbolTable,
}

impl EncodeContext<'_> {
    /// Byte offset from the current word to a label or `#offset` operand.
    fn relative_offset(&self, target: &Operand) -> Result<i64, EncodeErrorKind> {
        match target {
            Operand::Immediate(offset) => Ok(*offset),
            Operand::Label(name) => self
                .symbols
                .address_of(name)
                .map(|address| i64::from(address) - i64::from(self.address))
                .ok_or_else(|| EncodeErrorKind::UndefinedLabel(name.clone())),
            _ => Err(OperandError::Expected {
                expected: "label or #offset",
                found: "register or address".to_string(),
            }
            .into()),
        }
    }
}

/// Converts a byte offset to a signed word offset of `bits` width.
#[allow(clippy::cast_possible_truncation)]
fn word_offset(offset: i64, bits: u32) -> Result<i32, EncodeErrorKind> {
    if offset % 4 != 0 {
        return Err(EncodeErrorKind::MisalignedOffset(offset));
    }
    let words = offset / 4;
    if !fits_signed(words, bits) {
        return Err(EncodeErrorKind::OffsetOutOfRange { offset, bits });
    }
    Ok(words as i32)
}

/// Requires every register to use the view `sf`.
fn same_width(sf: bool, regs: &[RegOperand]) -> Result<(), EncodeErrorKind> {
    regs.iter()
        .find(|reg| reg.sf != sf)
        .map_or(Ok(()), |reg| {
            Err(EncodeErrorKind::WidthMismatch(reg.reg.name(reg.sf)))
        })
}

/// Encodes one instruction or directive.
///
/// Aliases are expanded and the canonical form is encoded in their place.
///
/// # Errors
///
/// Returns an [`EncodeErrorKind`] when the operands do not fit the
/// instruction.
pub fn encode_instruction(
    mnemonic: Mnemonic,
    operands: &[Operand],
    ctx: &EncodeContext<'_>,
) -> Result<u32, EncodeErrorKind> {
    match mnemonic {
        Mnemonic::Arithmetic(op) => encode_arithmetic(op, operands),
        Mnemonic::Logical { op, negate } => encode_logical(op, negate, operands),
        Mnemonic::WideMove(op) => encode_wide_move(op, operands),
        Mnemonic::Multiply { subtract } => encode_multiply(subtract, operands),
        Mnemonic::Load => encode_transfer(true, operands, ctx),
        Mnemonic::Store => encode_transfer(false, operands, ctx),
        Mnemonic::Branch => encode_branch(operands, ctx),
        Mnemonic::BranchRegister => encode_branch_register(operands),
        Mnemonic::BranchConditional(cond) => encode_branch_conditional(cond, operands, ctx),
        Mnemonic::Int => encode_int(operands, ctx),
        Mnemonic::Alias(alias) => {
            let (canonical, rewritten) = expand_alias(alias, operands)?;
            encode_instruction(canonical, &rewritten, ctx)
        }
    }
}

/// Encodes a line and attaches its line number to any error.
///
/// # Errors
///
/// Returns an [`EncodeError`] when [`encode_instruction`] fails.
pub fn encode_line(
    mnemonic: Mnemonic,
    operands: &[Operand],
    ctx: &EncodeContext<'_>,
    line: usize,
) -> Result<u32, EncodeError> {
    encode_instruction(mnemonic, operands, ctx).map_err(|kind| EncodeError { kind, line })
}
