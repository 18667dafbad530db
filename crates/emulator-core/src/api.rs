//! Host-facing API for embedding the emulator core.

use thiserror::Error;

use crate::memory::Memory;
use crate::state::{ArchitecturalState, RunState};
use crate::FaultCode;

/// Run-loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Stop after this many executed instructions.
    pub step_limit: Option<u64>,
    /// Stop when a taken branch targets its own address.
    pub detect_stuck_pc: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            detect_stuck_pc: true,
        }
    }
}

/// Complete machine state owned by one emulation run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Register file, PC and flags.
    pub arch: ArchitecturalState,
    /// Backed 2 MiB memory.
    pub memory: Memory,
    /// Loop state.
    pub run_state: RunState,
}

impl CoreState {
    /// Creates a machine in the reset state with zeroed memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a machine and loads `image` at address 0.
    ///
    /// Returns the state and the number of image bytes that did not fit.
    #[must_use]
    pub fn with_image(image: &[u8]) -> (Self, usize) {
        let mut state = Self::new();
        let truncated = state.memory.load_image(image);
        (state, truncated)
    }
}

/// Peripheral transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MmioError {
    /// The address is not served by this peripheral.
    #[error("address {addr:#010x} is not mapped by the peripheral")]
    Unmapped {
        /// Rejected address.
        addr: u64,
    },
    /// The peripheral could not complete the write.
    #[error("peripheral write failed")]
    WriteFailed,
}

/// Result categories for accepted peripheral writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MmioWriteResult {
    /// The write had a modeled side effect.
    Applied,
    /// The address is inside the window but has no modeled register.
    Ignored,
}

/// Store path for memory-mapped peripheral registers.
///
/// Only stores are routed here. Loads from the peripheral window read plain
/// memory.
pub trait MmioBus {
    /// Writes a 32-bit value to a peripheral register.
    ///
    /// # Errors
    ///
    /// Returns an [`MmioError`] when the peripheral rejects the write.
    fn write32(&mut self, addr: u64, value: u32) -> Result<MmioWriteResult, MmioError>;
}

/// Bus that accepts and discards every peripheral write.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMmio;

impl MmioBus for NullMmio {
    fn write32(&mut self, addr: u64, value: u32) -> Result<MmioWriteResult, MmioError> {
        tracing::debug!(addr, value, "peripheral write discarded");
        Ok(MmioWriteResult::Ignored)
    }
}

/// Result of one fetch-decode-execute step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The instruction completed.
    Retired {
        /// The instruction set PC itself.
        pc_written: bool,
    },
    /// A recoverable fault suppressed the instruction's memory effect.
    Skipped {
        /// Suppressing fault.
        cause: FaultCode,
    },
    /// The halt word was fetched.
    Halted,
    /// A taken branch did not move PC.
    StuckPc,
    /// A terminal fault stopped the run.
    Fault {
        /// Terminal fault.
        cause: FaultCode,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Halt word reached.
    Halted,
    /// Self-branch detected.
    StuckPc,
    /// Configured step limit reached.
    StepLimit,
    /// Terminal fetch or decode fault.
    Fault(FaultCode),
}

/// Aggregated outcome of a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Instructions executed, including skipped ones.
    pub steps: u64,
    /// Stop condition.
    pub stop: StopReason,
}
