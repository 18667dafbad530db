//! Branch encoders.

use a64_core::{Branch, Condition};

use super::{word_offset, EncodeContext, EncodeErrorKind};
use crate::operand::{Operand, Operands};

/// Encodes `b <label|#offset>`.
///
/// # Errors
///
/// Returns an error for an undefined label or an offset that is unaligned or
/// outside ±128 MiB.
pub fn encode_branch(
    operands: &[Operand],
    ctx: &EncodeContext<'_>,
) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let target = cursor.next("branch target")?;
    cursor.finish()?;
    let simm26 = word_offset(ctx.relative_offset(target)?, 26)?;
    Ok(Branch::Unconditional { simm26 }.encode())
}

/// Encodes `br xn`.
///
/// # Errors
///
/// Returns an error unless the single operand is an X register.
pub fn encode_branch_register(operands: &[Operand]) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let xn = cursor.register("target register")?;
    cursor.finish()?;
    if !xn.sf {
        return Err(EncodeErrorKind::WidthMismatch(xn.reg.name(false)));
    }
    Ok(Branch::Register { xn: xn.reg }.encode())
}

/// Encodes `b.<cond> <label|#offset>`.
///
/// # Errors
///
/// Returns an error for an undefined label or an offset that is unaligned or
/// outside ±1 MiB.
pub fn encode_branch_conditional(
    cond: Condition,
    operands: &[Operand],
    ctx: &EncodeContext<'_>,
) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let target = cursor.next("branch target")?;
    cursor.finish()?;
    let simm19 = word_offset(ctx.relative_offset(target)?, 19)?;
    Ok(Branch::Conditional { cond, simm19 }.encode())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{encode, encode_at};
    use super::super::EncodeErrorKind;
    use crate::symbols::SymbolTable;

    fn loop_symbols() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        symbols.define("loop", 0x4, 1).expect("defines");
        symbols.define("done", 0x10, 5).expect("defines");
        symbols
    }

    #[test]
    fn backward_and_forward_labels() {
        let symbols = loop_symbols();
        assert_eq!(encode_at("b.ne loop", 0x8, &symbols), Ok(0x54FF_FFE1));
        assert_eq!(encode_at("b.eq done", 0x8, &symbols), Ok(0x5400_0040));
        assert_eq!(encode_at("b done", 0x8, &symbols), Ok(0x1400_0002));
        assert_eq!(encode_at("b loop", 0x4, &symbols), Ok(0x1400_0000));
    }

    #[test]
    fn immediate_offsets() {
        assert_eq!(encode("b #-4"), Ok(0x17FF_FFFF));
        assert_eq!(encode("b.al #0"), Ok(0x5400_000E));
    }

    #[test]
    fn range_and_register_checks() {
        assert_eq!(
            encode("b.eq #1048576"),
            Err(EncodeErrorKind::OffsetOutOfRange {
                offset: 1 << 20,
                bits: 19
            })
        );
        assert_eq!(encode("b #134217724"), Ok(0x15FF_FFFF));
        assert_eq!(encode("b #2"), Err(EncodeErrorKind::MisalignedOffset(2)));
        assert_eq!(
            encode("br w1"),
            Err(EncodeErrorKind::WidthMismatch("w1".to_string()))
        );
    }
}
