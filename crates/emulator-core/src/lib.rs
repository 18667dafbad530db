//! Emulator core for an AArch64 integer subset.
//!
//! The crate models a single core with 31 general-purpose registers, a
//! program counter, NZCV flags and 2 MiB of flat little-endian memory. Raw
//! instruction words are decoded into typed payloads that also re-encode, so
//! the assembler and the decoder share one definition of every bit field.

/// Memory model primitives and fixed region map.
pub mod memory;
pub use memory::{
    decode_memory_region, validate_data_access, validate_fetch_access, Memory, MemoryRegion,
    GPIO_END, GPIO_START, MEMORY_SIZE, RAM_END, RAM_START,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    CoreConfig, CoreState, MmioBus, MmioError, MmioWriteResult, NullMmio, RunOutcome,
    StepOutcome, StopReason,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{ArchitecturalState, Pstate, Register, RunState, GENERAL_REGISTER_COUNT};

/// Bit-field helpers, family classification and condition codes.
pub mod encoding;
pub use encoding::{
    bit, bits, classify, fits_signed, sign_extend, Condition, InstructionType, HALT_WORD,
    INSTRUCTION_BYTES,
};

/// Shift and rotate engine.
pub mod shift;
pub use shift::{shift, ShiftType};

/// Instruction decode pipeline with field extraction and validation.
pub mod decoder;
pub use decoder::{
    ArithmeticOp, Branch, DecodedInstruction, Decoder, DpImmOperation, DpImmediate,
    DpRegOperation, DpRegister, LoadLiteral, LogicalOp, SingleDataTransfer, TransferOffset,
    WideMoveOp,
};

/// Load/store effective-address resolution.
pub mod addressing;
pub use addressing::{resolve, unsigned_offset_scale, AddressingMode};

/// Fault taxonomy.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{execute_instruction, run, step_one, ExecuteOutcome, FlagsUpdate};

/// Memory-mapped peripherals.
pub mod peripherals;
pub use peripherals::{GpioPeripheral, PinEvent};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble, disassemble_image, disassemble_word, DisassemblyRow};

/// Final-state text dump.
pub mod dump;
pub use dump::format_final_state;

// Used by the `a64-emu` binary.
use anyhow as _;
use clap as _;
use tracing_subscriber as _;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
