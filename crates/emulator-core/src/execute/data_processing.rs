//! Immediate and register data-processing execution.

use super::flags::{add_with_flags, logical_flags, sub_with_flags, FlagsUpdate};
use crate::decoder::{
    ArithmeticOp, DpImmOperation, DpImmediate, DpRegOperation, DpRegister, LogicalOp, WideMoveOp,
};
use crate::shift::shift;
use crate::state::ArchitecturalState;

const fn width_mask(sf: bool) -> u64 {
    if sf {
        u64::MAX
    } else {
        0xFFFF_FFFF
    }
}

fn arithmetic(
    op: ArithmeticOp,
    op1: u64,
    op2: u64,
    sf: bool,
    zero_destination: bool,
) -> (u64, FlagsUpdate) {
    let (result, nzcv) = if op.is_subtract() {
        sub_with_flags(op1, op2, sf)
    } else {
        add_with_flags(op1, op2, sf)
    };
    let update = if op.sets_flags() {
        FlagsUpdate::Set(nzcv)
    } else if zero_destination {
        FlagsUpdate::NegativeZero(nzcv)
    } else {
        FlagsUpdate::None
    };
    (result, update)
}

/// Executes an immediate-operand data-processing instruction.
pub fn execute_dp_immediate(arch: &mut ArchitecturalState, instr: &DpImmediate) {
    let sf = instr.sf;
    match instr.operation {
        DpImmOperation::Arithmetic {
            op,
            shift12,
            imm12,
            rn,
        } => {
            let imm = u64::from(imm12) << if shift12 { 12 } else { 0 };
            let (result, update) = arithmetic(op, arch.read(rn, sf), imm, sf, false);
            arch.write(instr.rd, sf, result);
            arch.set_pstate(update.apply(arch.pstate()));
        }
        DpImmOperation::WideMove { op, hw, imm16 } => {
            let lane = 16 * u32::from(hw);
            let shifted = u64::from(imm16) << lane;
            let mask = width_mask(sf);
            let result = match op {
                WideMoveOp::Movz => shifted,
                WideMoveOp::Movn => !shifted & mask,
                WideMoveOp::Movk => {
                    let keep = !(0xFFFF_u64 << lane);
                    (arch.read(instr.rd, sf) & keep) | shifted
                }
            };
            arch.write(instr.rd, sf, result & mask);
        }
    }
}

/// Executes a register-operand data-processing instruction.
///
/// Arithmetic and logical forms update flags for their flag-setting variants
/// and whenever the destination is the zero register. A plain `add`/`sub`
/// into the zero register only updates N and Z. Multiplies never touch flags.
pub fn execute_dp_register(arch: &mut ArchitecturalState, instr: &DpRegister) {
    let sf = instr.sf;
    let mask = width_mask(sf);
    let op1 = arch.read(instr.rn, sf);
    let rm = arch.read(instr.rm, sf);

    let (result, update) = match instr.operation {
        DpRegOperation::Arithmetic {
            op,
            shift: kind,
            amount,
        } => {
            let op2 = shift(rm, u32::from(amount), kind, sf);
            arithmetic(op, op1, op2, sf, instr.rd.is_zero())
        }
        DpRegOperation::Logical {
            op,
            negate,
            shift: kind,
            amount,
        } => {
            let shifted = shift(rm, u32::from(amount), kind, sf);
            let op2 = if negate { !shifted & mask } else { shifted };
            let result = match op {
                LogicalOp::And | LogicalOp::Ands => op1 & op2,
                LogicalOp::Orr => op1 | op2,
                LogicalOp::Eor => op1 ^ op2,
            };
            let update = if op.sets_flags() || instr.rd.is_zero() {
                FlagsUpdate::Set(logical_flags(result, sf))
            } else {
                FlagsUpdate::None
            };
            (result, update)
        }
        DpRegOperation::Multiply { subtract, ra } => {
            let product = op1.wrapping_mul(rm);
            let accumulator = arch.read(ra, sf);
            let result = if subtract {
                accumulator.wrapping_sub(product)
            } else {
                accumulator.wrapping_add(product)
            };
            (result & mask, FlagsUpdate::None)
        }
    };

    arch.write(instr.rd, sf, result);
    arch.set_pstate(update.apply(arch.pstate()));
}

#[cfg(test)]
mod tests {
    use super::{execute_dp_immediate, execute_dp_register};
    use crate::decoder::{DecodedInstruction, Decoder, DpImmediate, DpRegister};
    use crate::state::{ArchitecturalState, Pstate, Register};

    fn reg(index: u8) -> Register {
        Register::new(index).expect("valid register index")
    }

    fn dp_imm(word: u32) -> DpImmediate {
        match Decoder::decode(word) {
            DecodedInstruction::DpImmediate(instr) => instr,
            other => panic!("expected immediate data processing, got {other:?}"),
        }
    }

    fn dp_reg(word: u32) -> DpRegister {
        match Decoder::decode(word) {
            DecodedInstruction::DpRegister(instr) => instr,
            other => panic!("expected register data processing, got {other:?}"),
        }
    }

    #[test]
    fn adds_all_ones_plus_one_sets_c_and_z() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(0), true, u64::MAX);
        // adds x0, x0, #1
        execute_dp_immediate(&mut arch, &dp_imm(0xB100_0400));
        assert_eq!(arch.x(reg(0)), 0);
        assert_eq!(
            arch.pstate(),
            Pstate {
                n: false,
                z: true,
                c: true,
                v: false,
            }
        );
    }

    #[test]
    fn add_immediate_with_shift_leaves_flags() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(1), true, 1);
        // add x0, x1, #1, lsl #12
        execute_dp_immediate(&mut arch, &dp_imm(0x9140_0420));
        assert_eq!(arch.x(reg(0)), 0x1001);
        assert_eq!(arch.pstate(), Pstate::default());
    }

    #[test]
    fn narrow_subtract_wraps_and_zero_extends() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(1), true, 0xFFFF_FFFF_0000_0000);
        // sub w0, w1, #1
        execute_dp_immediate(&mut arch, &dp_imm(0x5100_0420));
        assert_eq!(arch.x(reg(0)), 0xFFFF_FFFF);
    }

    #[test]
    fn wide_moves_follow_lane_semantics() {
        let mut arch = ArchitecturalState::default();
        // movz x0, #0x1234, lsl #16
        execute_dp_immediate(&mut arch, &dp_imm(0xD2A2_4680));
        assert_eq!(arch.x(reg(0)), 0x1234_0000);

        arch.write(reg(0), true, 0xAAAA_BBBB_CCCC_DDDD);
        // movk x0, #0x1234, lsl #16
        execute_dp_immediate(&mut arch, &dp_imm(0xF2A2_4680));
        assert_eq!(arch.x(reg(0)), 0xAAAA_BBBB_1234_DDDD);

        // movn w0, #0
        execute_dp_immediate(&mut arch, &dp_imm(0x1280_0000));
        assert_eq!(arch.x(reg(0)), 0xFFFF_FFFF);

        // movn x0, #1
        execute_dp_immediate(&mut arch, &dp_imm(0x9280_0020));
        assert_eq!(arch.x(reg(0)), 0xFFFF_FFFF_FFFF_FFFE);
    }

    #[test]
    fn movk_narrow_clears_upper_half() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(0), true, u64::MAX);
        // movk w0, #0x1, lsl #16
        execute_dp_immediate(&mut arch, &dp_imm(0x72A0_0020));
        assert_eq!(arch.x(reg(0)), 0x0001_FFFF);
    }

    #[test]
    fn register_add_uses_shifted_operand() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(0), true, 1);
        arch.write(reg(1), true, 3);
        // add x2, x0, x1, lsl #2
        execute_dp_register(&mut arch, &dp_reg(0x8B01_0802));
        assert_eq!(arch.x(reg(2)), 13);
        assert_eq!(arch.pstate(), Pstate::default());
    }

    #[test]
    fn compare_with_zero_destination_updates_flags() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(0), true, 3);
        arch.write(reg(1), true, 5);
        // cmp x0, x1 (subs xzr, x0, x1)
        execute_dp_register(&mut arch, &dp_reg(0xEB01_001F));
        assert_eq!(
            arch.pstate(),
            Pstate {
                n: true,
                z: false,
                c: false,
                v: false,
            }
        );
        assert_eq!(arch.x(Register::ZR), 0);
    }

    #[test]
    fn plain_arithmetic_into_zero_register_keeps_carry_and_overflow() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(0), true, u64::MAX);
        arch.write(reg(1), true, 1);
        arch.set_pstate(Pstate {
            n: true,
            z: false,
            c: false,
            v: true,
        });
        // add xzr, x0, x1
        execute_dp_register(&mut arch, &dp_reg(0x8B01_001F));
        assert_eq!(
            arch.pstate(),
            Pstate {
                n: false,
                z: true,
                c: false,
                v: true,
            }
        );

        arch.write(reg(0), true, 3);
        arch.write(reg(1), true, 5);
        arch.set_pstate(Pstate {
            n: false,
            z: true,
            c: true,
            v: true,
        });
        // sub xzr, x0, x1
        execute_dp_register(&mut arch, &dp_reg(0xCB01_001F));
        assert_eq!(
            arch.pstate(),
            Pstate {
                n: true,
                z: false,
                c: true,
                v: true,
            }
        );
        assert_eq!(arch.x(Register::ZR), 0);
    }

    #[test]
    fn logical_negation_and_flags() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(1), true, 0xFF);
        arch.write(reg(2), true, 0x0F);
        // bic x0, x1, x2
        execute_dp_register(&mut arch, &dp_reg(0x8A22_0020));
        assert_eq!(arch.x(reg(0)), 0xF0);
        assert_eq!(arch.pstate(), Pstate::default());

        // tst x1, x2 (ands xzr, x1, x2)
        arch.set_pstate(Pstate {
            n: false,
            z: false,
            c: true,
            v: true,
        });
        execute_dp_register(&mut arch, &dp_reg(0xEA02_003F));
        assert_eq!(
            arch.pstate(),
            Pstate {
                n: false,
                z: false,
                c: false,
                v: false,
            }
        );

        // mvn w0, w2 (orn w0, wzr, w2)
        execute_dp_register(&mut arch, &dp_reg(0x2A22_03E0));
        assert_eq!(arch.x(reg(0)), 0xFFFF_FFF0);

        // eor x0, x1, x2, lsr #4
        execute_dp_register(&mut arch, &dp_reg(0xCA42_1020));
        assert_eq!(arch.x(reg(0)), 0xFF);
    }

    #[test]
    fn multiply_ignores_flags_and_truncates() {
        let mut arch = ArchitecturalState::default();
        arch.write(reg(1), true, 0x1_0000_0001);
        arch.write(reg(2), true, 3);
        arch.write(reg(3), true, 10);
        // madd x0, x1, x2, x3
        execute_dp_register(&mut arch, &dp_reg(0x9B02_0C20));
        assert_eq!(arch.x(reg(0)), 0x3_0000_000D);
        // msub w0, w1, w2, w3
        execute_dp_register(&mut arch, &dp_reg(0x1B02_8C20));
        assert_eq!(arch.x(reg(0)), 7);
        assert_eq!(arch.pstate(), Pstate::default());
    }
}
