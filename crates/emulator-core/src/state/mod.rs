//! Architectural CPU state model primitives.

/// Register file, program counter and condition flags.
pub mod registers;
/// Loop run-state tracking.
pub mod run_state;

pub use registers::{ArchitecturalState, Pstate, Register, GENERAL_REGISTER_COUNT};
pub use run_state::RunState;
