//! Bit-field primitives, instruction family classification and condition codes.
//!
//! Everything here is a pure function of the raw 32-bit instruction word. The
//! assembler packs fields with the same constants the decoder unpacks them with.

use crate::state::Pstate;

/// Reserved word that terminates emulation (`and x0, x0, x0`).
pub const HALT_WORD: u32 = 0x8A00_0000;

/// Size in bytes of one instruction word.
pub const INSTRUCTION_BYTES: u64 = 4;

/// Extracts `width` bits of `word` starting at bit `lsb`.
#[must_use]
pub const fn bits(word: u32, lsb: u32, width: u32) -> u32 {
    if width >= 32 {
        word >> lsb
    } else {
        (word >> lsb) & ((1 << width) - 1)
    }
}

/// Returns `true` when bit `index` of `word` is set.
#[must_use]
pub const fn bit(word: u32, index: u32) -> bool {
    (word >> index) & 1 == 1
}

/// Sign-extends the low `width` bits of `value` to a full `i64`.
///
/// Bits above `width` are ignored. A `width` of 64 or more returns the value
/// reinterpreted as signed.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn sign_extend(value: u64, width: u32) -> i64 {
    if width == 0 {
        return 0;
    }
    if width >= 64 {
        return value as i64;
    }
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

/// Returns `true` when `value` fits a `width`-bit two's-complement field.
#[must_use]
pub const fn fits_signed(value: i64, width: u32) -> bool {
    let min = -(1i64 << (width - 1));
    let max = (1i64 << (width - 1)) - 1;
    value >= min && value <= max
}

/// Instruction family discriminant derived from `op0` (bits 28..25).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionType {
    /// Data processing with an immediate operand.
    DpImmediate,
    /// Data processing with register operands.
    DpRegister,
    /// Single data transfer (load/store with a base register).
    SingleDataTransfer,
    /// PC-relative load literal.
    LoadLiteral,
    /// Unconditional, register and conditional branches.
    Branch,
    /// The reserved termination word.
    Halt,
    /// Anything outside the supported subset.
    Unknown,
}

/// Classifies a raw word into its instruction family.
///
/// The halt sentinel is checked before `op0`. Transfers and literal loads share
/// an `op0` pattern and are split on bit 31.
#[must_use]
pub const fn classify(word: u32) -> InstructionType {
    if word == HALT_WORD {
        return InstructionType::Halt;
    }
    let op0 = bits(word, 25, 4);
    if op0 & 0b1110 == 0b1000 {
        InstructionType::DpImmediate
    } else if op0 & 0b0111 == 0b0101 {
        InstructionType::DpRegister
    } else if op0 & 0b0101 == 0b0100 {
        if bit(word, 31) {
            InstructionType::SingleDataTransfer
        } else {
            InstructionType::LoadLiteral
        }
    } else if op0 & 0b1110 == 0b1010 {
        InstructionType::Branch
    } else {
        InstructionType::Unknown
    }
}

/// Condition codes accepted by `b.<cond>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Condition {
    /// Equal (`Z`).
    Eq = 0b0000,
    /// Not equal (`!Z`).
    Ne = 0b0001,
    /// Signed greater or equal (`N == V`).
    Ge = 0b1010,
    /// Signed less than (`N != V`).
    Lt = 0b1011,
    /// Signed greater than (`!Z && N == V`).
    Gt = 0b1100,
    /// Signed less or equal (`!(!Z && N == V)`).
    Le = 0b1101,
    /// Always.
    Al = 0b1110,
}

impl Condition {
    /// All supported condition codes in encoding order.
    pub const ALL: [Self; 7] = [
        Self::Eq,
        Self::Ne,
        Self::Ge,
        Self::Lt,
        Self::Gt,
        Self::Le,
        Self::Al,
    ];

    /// Decodes a 4-bit condition field.
    #[must_use]
    pub const fn from_u4(bits: u8) -> Option<Self> {
        match bits {
            0b0000 => Some(Self::Eq),
            0b0001 => Some(Self::Ne),
            0b1010 => Some(Self::Ge),
            0b1011 => Some(Self::Lt),
            0b1100 => Some(Self::Gt),
            0b1101 => Some(Self::Le),
            0b1110 => Some(Self::Al),
            _ => None,
        }
    }

    /// Returns the 4-bit encoding.
    #[must_use]
    pub const fn as_u4(self) -> u8 {
        self as u8
    }

    /// Parses the lowercase assembler suffix (`eq`, `ne`, ...).
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cond| cond.suffix().eq_ignore_ascii_case(suffix))
    }

    /// Returns the lowercase assembler suffix.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Al => "al",
        }
    }

    /// Evaluates the condition against the current flags.
    #[must_use]
    pub const fn holds(self, flags: Pstate) -> bool {
        match self {
            Self::Eq => flags.z,
            Self::Ne => !flags.z,
            Self::Ge => flags.n == flags.v,
            Self::Lt => flags.n != flags.v,
            Self::Gt => !flags.z && flags.n == flags.v,
            Self::Le => !(!flags.z && flags.n == flags.v),
            Self::Al => true,
        }
    }
}
