//! Fault codes and their diagnostic classes.

use thiserror::Error;

/// Fault classes used for diagnostics aggregation and loop policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder could not classify an instruction word.
    Decode,
    /// Instruction fetch violated PC bounds or alignment.
    Fetch,
    /// Data access outside the modeled memory region.
    Memory,
    /// Decoded payload and addressing mode disagree.
    Consistency,
    /// Peripheral rejected a memory-mapped write.
    Mmio,
}

/// Stable fault taxonomy raised by fetch, decode and execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Word does not match any supported instruction family.
    #[error("unknown instruction encoding")]
    UnknownInstruction = 0x01,
    /// Program counter is not a multiple of four.
    #[error("program counter is not word aligned")]
    MisalignedPc = 0x02,
    /// Program counter points outside modeled memory.
    #[error("program counter outside memory bounds")]
    PcOutOfBounds = 0x03,
    /// Load or store touched bytes outside modeled memory.
    #[error("data access outside memory bounds")]
    MemoryOutOfBounds = 0x04,
    /// Resolver received an addressing mode the payload cannot supply.
    #[error("addressing mode does not match decoded payload")]
    AddressingModeMismatch = 0x05,
    /// Memory-mapped peripheral failed to accept a store.
    #[error("peripheral write failed")]
    MmioWriteFailed = 0x06,
}

impl FaultCode {
    /// Converts a fault code to its stable numeric value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable numeric value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UnknownInstruction),
            0x02 => Some(Self::MisalignedPc),
            0x03 => Some(Self::PcOutOfBounds),
            0x04 => Some(Self::MemoryOutOfBounds),
            0x05 => Some(Self::AddressingModeMismatch),
            0x06 => Some(Self::MmioWriteFailed),
            _ => None,
        }
    }

    /// Returns the diagnostics fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnknownInstruction => FaultClass::Decode,
            Self::MisalignedPc | Self::PcOutOfBounds => FaultClass::Fetch,
            Self::MemoryOutOfBounds => FaultClass::Memory,
            Self::AddressingModeMismatch => FaultClass::Consistency,
            Self::MmioWriteFailed => FaultClass::Mmio,
        }
    }

    /// Faults that end the run instead of skipping the current instruction.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self.class(), FaultClass::Decode | FaultClass::Fetch)
    }
}
