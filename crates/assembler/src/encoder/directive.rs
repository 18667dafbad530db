//! `.int` directive.

use super::{EncodeContext, EncodeErrorKind};
use crate::operand::{Operand, OperandError, Operands};

/// Encodes `.int <value|label>` as a raw 32-bit word.
///
/// Negative values are stored in two's complement. A label stores its
/// absolute address.
///
/// # Errors
///
/// Returns an error for a value outside `-2^31..=2^32-1` or an undefined
/// label.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_int(operands: &[Operand], ctx: &EncodeContext<'_>) -> Result<u32, EncodeErrorKind> {
    let mut cursor = Operands::new(operands);
    let value = cursor.next("value")?;
    cursor.finish()?;
    match value {
        Operand::Immediate(value) => {
            if (i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(value) {
                Ok(*value as u32)
            } else {
                Err(EncodeErrorKind::ImmediateOutOfRange {
                    value: *value,
                    bits: 32,
                })
            }
        }
        Operand::Label(name) => ctx
            .symbols
            .address_of(name)
            .ok_or_else(|| EncodeErrorKind::UndefinedLabel(name.clone())),
        _ => Err(OperandError::Expected {
            expected: "value or label",
            found: "register or address".to_string(),
        }
        .into()),
    }
}
