//! Load/store encoders.

use a64_core::{unsigned_offset_scale, LoadLiteral, SingleDataTransfer, TransferOffset};

use super::{word_offset, EncodeContext, EncodeErrorKind};
use crate::operand::{AddressOffset, Operand, Operands, RegOperand};

const SIMM9_MIN: i64 = -256;
const SIMM9_MAX: i64 = 255;
const IMM12_MAX: i64 = 0xFFF;

fn require_x(reg: RegOperand) -> Result<(), EncodeErrorKind> {
    if reg.sf {
        Ok(())
    } else {
        Err(EncodeErrorKind::WidthMismatch(reg.reg.name(false)))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn simm9(value: i64) -> Result<i16, EncodeErrorKind> {
    if (SIMM9_MIN..=SIMM9_MAX).contains(&value) {
        Ok(value as i16)
    } else {
        Err(EncodeErrorKind::ImmediateOutOfRange { value, bits: 9 })
    }
}

/// Converts a byte offset to the scaled `imm12` field.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn scaled_imm12(offset: i64, sf: bool) -> Result<u16, EncodeErrorKind> {
    let scale = unsigned_offset_scale(sf);
    if offset < 0 {
        return Err(EncodeErrorKind::ImmediateOutOfRange {
            value: offset,
            bits: 12,
        });
    }
    if offset % scale as i64 != 0 {
        return Err(EncodeErrorKind::UnalignedOffset { offset, scale });
    }
    let imm12 = offset / scale as i64;
    if imm12 > IMM12_MAX {
        return Err(EncodeErrorKind::ImmediateOutOfRange {
            value: offset,
            bits: 12,
        });
    }
    Ok(imm12 as u16)
}

/// Encodes `ldr`/`str`.
///
/// Accepted forms are `[xn]`, `[xn, #imm]`, `[xn, #simm]!`, `[xn], #simm` and
/// `[xn, xm]`. A load may also take a label or `#offset` as a PC-relative
/// literal address.
///
/// # Errors
///
/// Returns an error for offsets outside their field, a W base or offset
/// register, a store to a literal address, or an undefined label.
pub fn encode_transfer(
    load: bool,
    operands: &[Operand],
    ctx: &EncodeContext<'_>,
) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let rt = cursor.register("transfer register")?;
    let target = cursor.next("address")?;

    let Operand::Address(address) = target else {
        if !load {
            return Err(EncodeErrorKind::StoreLiteral);
        }
        cursor.finish()?;
        let simm19 = word_offset(ctx.relative_offset(target)?, 19)?;
        return Ok(LoadLiteral {
            sf: rt.sf,
            rt: rt.reg,
            simm19,
        }
        .encode());
    };

    require_x(address.base)?;
    let offset = match (address.offset, address.pre_index) {
        (AddressOffset::None, false) => match cursor.peek() {
            Some(Operand::Immediate(_)) => TransferOffset::PostIndexed {
                simm9: simm9(cursor.immediate("post-index offset")?)?,
            },
            _ => TransferOffset::Unsigned { imm12: 0 },
        },
        (AddressOffset::Immediate(value), false) => TransferOffset::Unsigned {
            imm12: scaled_imm12(value, rt.sf)?,
        },
        (AddressOffset::Immediate(value), true) => TransferOffset::PreIndexed {
            simm9: simm9(value)?,
        },
        (AddressOffset::Register(xm), false) => {
            require_x(xm)?;
            TransferOffset::Register { xm: xm.reg }
        }
        (AddressOffset::None, true) => {
            return Err(EncodeErrorKind::UnsupportedAddressing(
                "pre-index needs an immediate offset",
            ))
        }
        (AddressOffset::Register(_), true) => {
            return Err(EncodeErrorKind::UnsupportedAddressing(
                "register offsets cannot be pre-indexed",
            ))
        }
    };
    cursor.finish()?;

    Ok(SingleDataTransfer {
        sf: rt.sf,
        load,
        rt: rt.reg,
        xn: address.base.reg,
        offset,
    }
    .encode())
}
