//! Branch execution.

use crate::decoder::Branch;
use crate::state::ArchitecturalState;

#[allow(clippy::cast_sign_loss)]
fn offset_bytes(words: i32) -> u64 {
    (i64::from(words) * 4) as u64
}

/// Executes a branch and returns `true` when it wrote PC.
///
/// `br xzr` is a no-op and an untaken conditional branch leaves PC for the
/// caller to advance.
pub fn execute_branch(arch: &mut ArchitecturalState, branch: &Branch) -> bool {
    let pc = arch.pc();
    let target = match *branch {
        Branch::Unconditional { simm26 } => Some(pc.wrapping_add(offset_bytes(simm26))),
        Branch::Register { xn } => (!xn.is_zero()).then(|| arch.x(xn)),
        Branch::Conditional { cond, simm19 } => cond
            .holds(arch.pstate())
            .then(|| pc.wrapping_add(offset_bytes(simm19))),
    };
    match target {
        Some(target) => {
            arch.set_pc(target);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::execute_branch;
    use crate::decoder::Branch;
    use crate::encoding::Condition;
    use crate::state::{ArchitecturalState, Pstate, Register};

    fn at(pc: u64) -> ArchitecturalState {
        let mut arch = ArchitecturalState::default();
        arch.set_pc(pc);
        arch
    }

    #[test]
    fn unconditional_branch_moves_by_words() {
        let mut arch = at(0x10);
        assert!(execute_branch(&mut arch, &Branch::Unconditional { simm26: 3 }));
        assert_eq!(arch.pc(), 0x1C);
        assert!(execute_branch(&mut arch, &Branch::Unconditional { simm26: -7 }));
        assert_eq!(arch.pc(), 0);
    }

    #[test]
    fn register_branch_jumps_to_register_value() {
        let mut arch = at(0x10);
        let x3 = Register::new(3).expect("valid register");
        arch.write(x3, true, 0x400);
        assert!(execute_branch(&mut arch, &Branch::Register { xn: x3 }));
        assert_eq!(arch.pc(), 0x400);
    }

    #[test]
    fn register_branch_through_zero_register_is_noop() {
        let mut arch = at(0x10);
        assert!(!execute_branch(&mut arch, &Branch::Register { xn: Register::ZR }));
        assert_eq!(arch.pc(), 0x10);
    }

    #[test]
    fn eq_is_taken_at_reset() {
        let mut arch = at(0x8);
        let branch = Branch::Conditional {
            cond: Condition::Eq,
            simm19: -2,
        };
        assert!(execute_branch(&mut arch, &branch));
        assert_eq!(arch.pc(), 0);
    }

    #[test]
    fn untaken_conditional_leaves_pc() {
        let mut arch = at(0x8);
        arch.set_pstate(Pstate {
            n: false,
            z: false,
            c: false,
            v: false,
        });
        let branch = Branch::Conditional {
            cond: Condition::Eq,
            simm19: 4,
        };
        assert!(!execute_branch(&mut arch, &branch));
        assert_eq!(arch.pc(), 0x8);
    }
}
