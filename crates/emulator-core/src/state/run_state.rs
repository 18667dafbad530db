//! Loop state of the core between steps.

use crate::FaultCode;

/// Execution-state machine for the fetch-decode-execute loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// The halt word was fetched.
    Halted,
    /// A branch targeted itself and the loop guard stopped the run.
    StuckPc,
    /// A terminal fault stopped the run; PC still addresses the faulting word.
    FaultLatched(FaultCode),
}

#[cfg(test)]
mod tests {
    use super::RunState;

    #[test]
    fn run_state_default_is_running() {
        assert_eq!(RunState::default(), RunState::Running);
    }
}
