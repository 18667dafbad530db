//! Data-processing encoders: arithmetic, logical, wide move and multiply.

use a64_core::{
    ArithmeticOp, DpImmOperation, DpImmediate, DpRegOperation, DpRegister, LogicalOp, ShiftType,
    WideMoveOp,
};

use super::{same_width, EncodeErrorKind};
use crate::operand::{Operand, Operands};

const IMM12_MAX: i64 = 0xFFF;
const IMM16_MAX: i64 = 0xFFFF;

fn invalid_shift(kind: ShiftType, amount: i64) -> EncodeErrorKind {
    EncodeErrorKind::InvalidShift {
        kind: kind.mnemonic(),
        amount,
    }
}

/// Validates a register-operand shift. A missing shift is `lsl #0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn register_shift(
    shift: Option<(ShiftType, i64)>,
    sf: bool,
    allow_ror: bool,
) -> Result<(ShiftType, u8), EncodeErrorKind> {
    let Some((kind, amount)) = shift else {
        return Ok((ShiftType::Lsl, 0));
    };
    let width = if sf { 64 } else { 32 };
    if (kind == ShiftType::Ror && !allow_ror) || !(0..width).contains(&amount) {
        return Err(invalid_shift(kind, amount));
    }
    Ok((kind, amount as u8))
}

/// Encodes `add`/`adds`/`sub`/`subs` in immediate or shifted-register form.
///
/// # Errors
///
/// Returns an error for a malformed operand list, an immediate outside
/// 12 bits, a shift other than `lsl #0`/`lsl #12` on an immediate, a `ror`
/// register shift, or mixed register widths.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_arithmetic(op: ArithmeticOp, operands: &[Operand]) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let rd = cursor.register("destination register")?;
    let rn = cursor.register("first source register")?;

    if let Some(Operand::Immediate(_)) = cursor.peek() {
        let imm = cursor.immediate("immediate")?;
        let shift12 = match cursor.optional_shift()? {
            None | Some((ShiftType::Lsl, 0)) => false,
            Some((ShiftType::Lsl, 12)) => true,
            Some((kind, amount)) => return Err(invalid_shift(kind, amount)),
        };
        cursor.finish()?;
        same_width(rd.sf, &[rn])?;
        if !(0..=IMM12_MAX).contains(&imm) {
            return Err(EncodeErrorKind::ImmediateOutOfRange {
                value: imm,
                bits: 12,
            });
        }
        return Ok(DpImmediate {
            sf: rd.sf,
            rd: rd.reg,
            operation: DpImmOperation::Arithmetic {
                op,
                shift12,
                imm12: imm as u16,
                rn: rn.reg,
            },
        }
        .encode());
    }

    let rm = cursor.register("second source register")?;
    let (shift, amount) = register_shift(cursor.optional_shift()?, rd.sf, false)?;
    cursor.finish()?;
    same_width(rd.sf, &[rn, rm])?;
    Ok(DpRegister {
        sf: rd.sf,
        rd: rd.reg,
        rn: rn.reg,
        rm: rm.reg,
        operation: DpRegOperation::Arithmetic { op, shift, amount },
    }
    .encode())
}

/// Encodes the shifted-register bitwise operations.
///
/// # Errors
///
/// Returns an error for a malformed operand list, an out-of-range shift, or
/// mixed register widths. Bitmask immediates are not supported.
pub fn encode_logical(
    op: LogicalOp,
    negate: bool,
    operands: &[Operand],
) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let rd = cursor.register("destination register")?;
    let rn = cursor.register("first source register")?;
    let rm = cursor.register("second source register")?;
    let (shift, amount) = register_shift(cursor.optional_shift()?, rd.sf, true)?;
    cursor.finish()?;
    same_width(rd.sf, &[rn, rm])?;
    Ok(DpRegister {
        sf: rd.sf,
        rd: rd.reg,
        rn: rn.reg,
        rm: rm.reg,
        operation: DpRegOperation::Logical {
            op,
            negate,
            shift,
            amount,
        },
    }
    .encode())
}

/// Encodes `movn`/`movz`/`movk`.
///
/// # Errors
///
/// Returns an error when the immediate does not fit 16 bits or the lane shift
/// is not a multiple of 16 within the register width.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_wide_move(op: WideMoveOp, operands: &[Operand]) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let rd = cursor.register("destination register")?;
    let imm = cursor.immediate("immediate")?;
    let shift = cursor.optional_shift()?;
    cursor.finish()?;

    if !(0..=IMM16_MAX).contains(&imm) {
        return Err(EncodeErrorKind::ImmediateOutOfRange {
            value: imm,
            bits: 16,
        });
    }
    let lanes = if rd.sf { 4 } else { 2 };
    let hw = match shift {
        None => 0,
        Some((ShiftType::Lsl, amount))
            if amount % 16 == 0 && (0..lanes * 16).contains(&amount) =>
        {
            amount / 16
        }
        Some((kind, amount)) => return Err(invalid_shift(kind, amount)),
    };

    Ok(DpImmediate {
        sf: rd.sf,
        rd: rd.reg,
        operation: DpImmOperation::WideMove {
            op,
            hw: hw as u8,
            imm16: imm as u16,
        },
    }
    .encode())
}

/// Encodes `madd`/`msub`.
///
/// # Errors
///
/// Returns an error unless exactly four registers of one width are given.
pub fn encode_multiply(subtract: bool, operands: &[Operand]) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let rd = cursor.register("destination register")?;
    let rn = cursor.register("first source register")?;
    let rm = cursor.register("second source register")?;
    let ra = cursor.register("accumulator register")?;
    cursor.finish()?;
    same_width(rd.sf, &[rn, rm, ra])?;
    Ok(DpRegister {
        sf: rd.sf,
        rd: rd.reg,
        rn: rn.reg,
        rm: rm.reg,
        operation: DpRegOperation::Multiply {
            subtract,
            ra: ra.reg,
        },
    }
    .encode())
}
