//! Barrel shifter used by register-form data processing.

/// Shift kinds encoded in the two-bit `shift` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ShiftType {
    /// Logical shift left.
    Lsl = 0b00,
    /// Logical shift right.
    Lsr = 0b01,
    /// Arithmetic shift right.
    Asr = 0b10,
    /// Rotate right.
    Ror = 0b11,
}

impl ShiftType {
    /// Decodes the two-bit shift field.
    #[must_use]
    pub const fn from_u2(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Self::Lsl,
            0b01 => Self::Lsr,
            0b10 => Self::Asr,
            _ => Self::Ror,
        }
    }

    /// Returns the two-bit encoding.
    #[must_use]
    pub const fn as_u2(self) -> u32 {
        self as u32
    }

    /// Parses an assembler shift mnemonic.
    #[must_use]
    pub fn from_mnemonic(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "lsl" => Some(Self::Lsl),
            "lsr" => Some(Self::Lsr),
            "asr" => Some(Self::Asr),
            "ror" => Some(Self::Ror),
            _ => None,
        }
    }

    /// Returns the assembler shift mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Lsl => "lsl",
            Self::Lsr => "lsr",
            Self::Asr => "asr",
            Self::Ror => "ror",
        }
    }
}

/// Shifts `value` by `amount` at 64-bit (`is64`) or 32-bit width.
///
/// In 32-bit mode the input is truncated first and the result is truncated
/// again, so the upper half is always zero. Shifts by the operand width or
/// more saturate (zero, or the sign fill for `ASR`); rotations wrap modulo the
/// width.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub const fn shift(value: u64, amount: u32, kind: ShiftType, is64: bool) -> u64 {
    let width = if is64 { 64 } else { 32 };
    let mask = if is64 { u64::MAX } else { 0xFFFF_FFFF };
    let value = value & mask;

    let result = match kind {
        ShiftType::Lsl => {
            if amount >= width {
                0
            } else {
                value << amount
            }
        }
        ShiftType::Lsr => {
            if amount >= width {
                0
            } else {
                value >> amount
            }
        }
        ShiftType::Asr => {
            let signed = if is64 {
                value as i64
            } else {
                (value as u32 as i32) as i64
            };
            let amount = if amount >= width { width - 1 } else { amount };
            (signed >> amount) as u64
        }
        ShiftType::Ror => {
            let amount = amount % width;
            if amount == 0 {
                value
            } else {
                (value >> amount) | (value << (width - amount))
            }
        }
    };

    result & mask
}

#[cfg(test)]
mod tests {
    use super::{shift, ShiftType};
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 4, ShiftType::Lsl, true, 16)]
    #[case(0x8000_0000, 1, ShiftType::Lsl, false, 0)]
    #[case(0xF0, 4, ShiftType::Lsr, true, 0x0F)]
    #[case(0x8000_0000, 4, ShiftType::Asr, false, 0xF800_0000)]
    #[case(0x8000_0000_0000_0000, 63, ShiftType::Asr, true, u64::MAX)]
    #[case(0x8000_0000, 40, ShiftType::Asr, false, 0xFFFF_FFFF)]
    #[case(0x7000_0000, 40, ShiftType::Asr, false, 0)]
    #[case(1, 1, ShiftType::Ror, false, 0x8000_0000)]
    #[case(1, 1, ShiftType::Ror, true, 0x8000_0000_0000_0000)]
    #[case(0x1234, 36, ShiftType::Ror, false, 0x4000_0123)]
    #[case(0xFFFF_FFFF_0000_0001, 0, ShiftType::Lsl, false, 1)]
    fn shift_cases(
        #[case] value: u64,
        #[case] amount: u32,
        #[case] kind: ShiftType,
        #[case] is64: bool,
        #[case] expected: u64,
    ) {
        assert_eq!(shift(value, amount, kind, is64), expected);
    }

    #[test]
    fn shift_field_roundtrip() {
        for kind in [ShiftType::Lsl, ShiftType::Lsr, ShiftType::Asr, ShiftType::Ror] {
            assert_eq!(ShiftType::from_u2(kind.as_u2()), kind);
            assert_eq!(ShiftType::from_mnemonic(kind.mnemonic()), Some(kind));
        }
        assert_eq!(ShiftType::from_mnemonic("LSL"), Some(ShiftType::Lsl));
        assert_eq!(ShiftType::from_mnemonic("msl"), None);
    }

    proptest! {
        #[test]
        fn ror_by_zero_is_identity(value in any::<u64>(), is64 in any::<bool>()) {
            let expected = if is64 { value } else { value & 0xFFFF_FFFF };
            prop_assert_eq!(shift(value, 0, ShiftType::Ror, is64), expected);
        }

        #[test]
        fn lsl_then_lsr_recovers_low_bits(value in any::<u64>(), amount in 0u32..64) {
            let shifted = shift(value, amount, ShiftType::Lsl, true);
            let back = shift(shifted, amount, ShiftType::Lsr, true);
            let kept = if amount == 0 { value } else { value & (u64::MAX >> amount) };
            prop_assert_eq!(back, kept);
        }

        #[test]
        fn asr_of_negative_by_63_is_all_ones(value in (1u64 << 63)..=u64::MAX) {
            prop_assert_eq!(shift(value, 63, ShiftType::Asr, true), u64::MAX);
        }

        #[test]
        fn narrow_results_never_touch_upper_half(
            value in any::<u64>(),
            amount in 0u32..128,
            kind in 0u32..4,
        ) {
            let result = shift(value, amount, ShiftType::from_u2(kind), false);
            prop_assert_eq!(result >> 32, 0);
        }

        #[test]
        fn ror_wraps_modulo_width(value in any::<u64>(), amount in 0u32..64) {
            prop_assert_eq!(
                shift(value, amount, ShiftType::Ror, true),
                shift(value, amount + 64, ShiftType::Ror, true)
            );
            prop_assert_eq!(
                shift(value, amount, ShiftType::Ror, true),
                value.rotate_right(amount)
            );
        }
    }
}
