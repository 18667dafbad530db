//! Final-state text dump.

use std::fmt::Write as _;

use crate::state::Register;
use crate::CoreState;

/// Formats registers, PC, flags and every non-zero aligned memory word.
///
/// ```text
/// Registers:
/// X00 = 0000000000000005
/// ...
/// PC = 000000000000000c
/// PSTATE : -Z--
/// Non-zero memory:
/// 0x00000000: 0xd28000a0
/// ```
#[must_use]
pub fn format_final_state(state: &CoreState) -> String {
    let mut out = String::from("Registers:\n");
    for reg in (0..Register::ZR.index()).filter_map(Register::new) {
        out.push_str(&format_register(state, reg));
        out.push('\n');
    }
    let _ = writeln!(out, "PC = {:016x}", state.arch.pc());
    let _ = writeln!(out, "PSTATE : {}", state.arch.pstate());
    out.push_str("Non-zero memory:\n");
    for (addr, word) in state.memory.non_zero_words() {
        let _ = writeln!(out, "0x{addr:08x}: 0x{word:08x}");
    }
    out
}

/// Formats a single register line, as used by the dump.
#[must_use]
pub fn format_register(state: &CoreState, reg: Register) -> String {
    format!("X{:02} = {:016x}", reg.index(), state.arch.x(reg))
}
