//! General-purpose registers, NZCV flags and the architectural register file.

use std::fmt;

/// Number of backed general-purpose registers (`X0..X30`).
pub const GENERAL_REGISTER_COUNT: usize = 31;

/// Five-bit register field value. Index 31 is the zero register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Register(u8);

impl Register {
    /// The zero register (`XZR`/`WZR`).
    pub const ZR: Self = Self(31);

    /// Creates a register from an index in `0..=31`.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index <= 31 {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Creates a register from a raw instruction field, keeping the low five bits.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_field(field: u32) -> Self {
        Self((field & 0x1F) as u8)
    }

    /// Returns the 5-bit encoding.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the raw field for packing into an instruction word.
    #[must_use]
    pub const fn field(self) -> u32 {
        self.0 as u32
    }

    /// Returns `true` for the zero register.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 31
    }

    /// Returns the assembler name for the given view (`x3`, `w3`, `xzr`).
    #[must_use]
    pub fn name(self, sf: bool) -> String {
        let prefix = if sf { 'x' } else { 'w' };
        if self.is_zero() {
            format!("{prefix}zr")
        } else {
            format!("{prefix}{}", self.0)
        }
    }
}

/// Condition flags (`PSTATE.NZCV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct Pstate {
    /// Negative.
    pub n: bool,
    /// Zero.
    pub z: bool,
    /// Carry.
    pub c: bool,
    /// Signed overflow.
    pub v: bool,
}

impl Default for Pstate {
    /// Reset value: only `Z` is set.
    fn default() -> Self {
        Self {
            n: false,
            z: true,
            c: false,
            v: false,
        }
    }
}

impl fmt::Display for Pstate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, letter: char| if set { letter } else { '-' };
        write!(
            f,
            "{}{}{}{}",
            flag(self.n, 'N'),
            flag(self.z, 'Z'),
            flag(self.c, 'C'),
            flag(self.v, 'V')
        )
    }
}

/// Register file, program counter and flags of the modeled core.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    gpr: [u64; GENERAL_REGISTER_COUNT],
    pc: u64,
    pstate: Pstate,
}

impl ArchitecturalState {
    /// Reads a register through the 64-bit (`sf`) or 32-bit view.
    ///
    /// The zero register always reads as 0.
    #[must_use]
    pub const fn read(&self, reg: Register, sf: bool) -> u64 {
        if reg.is_zero() {
            return 0;
        }
        let value = self.gpr[reg.0 as usize];
        if sf {
            value
        } else {
            value & 0xFFFF_FFFF
        }
    }

    /// Writes a register through the 64-bit (`sf`) or 32-bit view.
    ///
    /// 32-bit writes zero the upper half. Writes to the zero register are
    /// discarded.
    pub const fn write(&mut self, reg: Register, sf: bool, value: u64) {
        if reg.is_zero() {
            return;
        }
        self.gpr[reg.0 as usize] = if sf { value } else { value & 0xFFFF_FFFF };
    }

    /// Reads the full 64-bit value of a register.
    #[must_use]
    pub const fn x(&self, reg: Register) -> u64 {
        self.read(reg, true)
    }

    /// Returns all backed registers in index order.
    #[must_use]
    pub const fn gprs(&self) -> &[u64; GENERAL_REGISTER_COUNT] {
        &self.gpr
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> u64 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u64) {
        self.pc = value;
    }

    /// Reads the condition flags.
    #[must_use]
    pub const fn pstate(&self) -> Pstate {
        self.pstate
    }

    /// Replaces the condition flags.
    pub const fn set_pstate(&mut self, pstate: Pstate) {
        self.pstate = pstate;
    }
}
