//! Instruction execution pipeline and fetch-decode-execute loop.
//!
//! Each step follows the same sequence:
//! 1. Validate PC bounds and alignment
//! 2. Fetch and decode the word at PC
//! 3. Dispatch on the decoded family
//! 4. Advance PC by four unless the instruction wrote it or halted
//!
//! Memory faults suppress only the faulting access. Fetch and decode faults
//! stop the run with PC still addressing the offending word.

mod branch;
mod data_processing;
mod flags;
mod transfer;

pub use branch::execute_branch;
pub use data_processing::{execute_dp_immediate, execute_dp_register};
pub use flags::{add_with_flags, logical_flags, sub_with_flags, FlagsUpdate};
pub use transfer::{execute_ldr, execute_str};

use crate::addressing::AddressingMode;
use crate::decoder::{DecodedInstruction, Decoder};
use crate::disasm::disassemble;
use crate::encoding::INSTRUCTION_BYTES;
use crate::memory::validate_fetch_access;
use crate::{
    CoreConfig, CoreState, FaultCode, MmioBus, RunOutcome, RunState, StepOutcome, StopReason,
};

/// Outcome of executing one decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecuteOutcome {
    /// Instruction completed.
    Retired {
        /// The instruction set PC itself.
        pc_written: bool,
    },
    /// A recoverable fault suppressed the instruction's memory effect.
    Skipped {
        /// Suppressing fault.
        cause: FaultCode,
    },
    /// Halt sentinel.
    Halt,
    /// The word could not be executed.
    Fault {
        /// Terminal fault.
        cause: FaultCode,
    },
}

/// Executes one decoded instruction against `state`.
///
/// PC is read but never advanced here; the caller applies the default stride
/// when `pc_written` is `false`.
pub fn execute_instruction(
    instr: &DecodedInstruction,
    state: &mut CoreState,
    mmio: &mut dyn MmioBus,
) -> ExecuteOutcome {
    let memory_result = match instr {
        DecodedInstruction::DpImmediate(dp) => {
            execute_dp_immediate(&mut state.arch, dp);
            Ok(())
        }
        DecodedInstruction::DpRegister(dp) => {
            execute_dp_register(&mut state.arch, dp);
            Ok(())
        }
        DecodedInstruction::SingleDataTransfer(transfer) => {
            let mode = transfer.addressing_mode();
            if transfer.load {
                execute_ldr(state, mode, instr)
            } else {
                execute_str(state, mmio, mode, instr)
            }
        }
        DecodedInstruction::LoadLiteral(_) => {
            execute_ldr(state, AddressingMode::LoadLiteral, instr)
        }
        DecodedInstruction::Branch(branch) => {
            return ExecuteOutcome::Retired {
                pc_written: execute_branch(&mut state.arch, branch),
            };
        }
        DecodedInstruction::Halt => return ExecuteOutcome::Halt,
        DecodedInstruction::Unknown(_) => {
            return ExecuteOutcome::Fault {
                cause: FaultCode::UnknownInstruction,
            };
        }
    };

    match memory_result {
        Ok(()) => ExecuteOutcome::Retired { pc_written: false },
        Err(cause) if cause.is_terminal() => ExecuteOutcome::Fault { cause },
        Err(cause) => ExecuteOutcome::Skipped { cause },
    }
}

fn stopped_outcome(run_state: RunState) -> Option<StepOutcome> {
    match run_state {
        RunState::Running => None,
        RunState::Halted => Some(StepOutcome::Halted),
        RunState::StuckPc => Some(StepOutcome::StuckPc),
        RunState::FaultLatched(cause) => Some(StepOutcome::Fault { cause }),
    }
}

fn fetch_and_decode(state: &CoreState) -> Result<(u32, DecodedInstruction), FaultCode> {
    let pc = state.arch.pc();
    validate_fetch_access(pc)?;
    let word = state.memory.read_u32(pc)?;
    Ok((word, Decoder::decode(word)))
}

/// Fetches, decodes and executes the instruction at PC.
///
/// Once the core has stopped, further calls return the same terminal outcome
/// without touching state.
pub fn step_one(state: &mut CoreState, mmio: &mut dyn MmioBus, config: &CoreConfig) -> StepOutcome {
    if let Some(outcome) = stopped_outcome(state.run_state) {
        return outcome;
    }

    let pc = state.arch.pc();
    let (word, instruction) = match fetch_and_decode(state) {
        Ok(fetched) => fetched,
        Err(cause) => {
            tracing::error!(pc, %cause, "instruction fetch failed");
            state.run_state = RunState::FaultLatched(cause);
            return StepOutcome::Fault { cause };
        }
    };
    tracing::trace!(pc, word, text = %disassemble(&instruction), "execute");

    match execute_instruction(&instruction, state, mmio) {
        ExecuteOutcome::Retired { pc_written: true } => {
            if config.detect_stuck_pc && state.arch.pc() == pc {
                tracing::info!(pc, "branch targets itself; stopping");
                state.run_state = RunState::StuckPc;
                return StepOutcome::StuckPc;
            }
            StepOutcome::Retired { pc_written: true }
        }
        ExecuteOutcome::Retired { pc_written: false } => {
            state.arch.set_pc(pc.wrapping_add(INSTRUCTION_BYTES));
            StepOutcome::Retired { pc_written: false }
        }
        ExecuteOutcome::Skipped { cause } => {
            tracing::warn!(pc, word, %cause, "memory access suppressed");
            state.arch.set_pc(pc.wrapping_add(INSTRUCTION_BYTES));
            StepOutcome::Skipped { cause }
        }
        ExecuteOutcome::Halt => {
            state.run_state = RunState::Halted;
            StepOutcome::Halted
        }
        ExecuteOutcome::Fault { cause } => {
            tracing::error!(pc, word, %cause, "stopping");
            state.run_state = RunState::FaultLatched(cause);
            StepOutcome::Fault { cause }
        }
    }
}

/// Runs until the core halts, faults, detects a self-branch or hits the step
/// limit.
pub fn run(state: &mut CoreState, mmio: &mut dyn MmioBus, config: &CoreConfig) -> RunOutcome {
    let mut steps = 0u64;
    let stop = loop {
        if config.step_limit.is_some_and(|limit| steps >= limit) {
            break StopReason::StepLimit;
        }
        match step_one(state, mmio, config) {
            StepOutcome::Retired { .. } | StepOutcome::Skipped { .. } => steps += 1,
            StepOutcome::Halted => break StopReason::Halted,
            StepOutcome::StuckPc => {
                steps += 1;
                break StopReason::StuckPc;
            }
            StepOutcome::Fault { cause } => break StopReason::Fault(cause),
        }
    };
    tracing::info!(steps, ?stop, pc = state.arch.pc(), "run finished");
    RunOutcome { steps, stop }
}
