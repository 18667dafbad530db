//! Instruction decoder for the supported AArch64 subset.
//!
//! [`Decoder::decode`] turns a raw word into a [`DecodedInstruction`]. Every
//! payload type also knows how to pack itself back into a word, so the
//! assembler and the decoder share one definition of each bit field.

use crate::addressing::AddressingMode;
use crate::encoding::{bit, bits, classify, sign_extend, Condition, InstructionType, HALT_WORD};
use crate::shift::ShiftType;
use crate::state::Register;

/// Add/subtract operations selected by `opc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArithmeticOp {
    /// `add`
    Add = 0b00,
    /// `adds`
    Adds = 0b01,
    /// `sub`
    Sub = 0b10,
    /// `subs`
    Subs = 0b11,
}

impl ArithmeticOp {
    /// Decodes the two-bit `opc` field.
    #[must_use]
    pub const fn from_opc(opc: u32) -> Self {
        match opc & 0b11 {
            0b00 => Self::Add,
            0b01 => Self::Adds,
            0b10 => Self::Sub,
            _ => Self::Subs,
        }
    }

    /// Returns the `opc` encoding.
    #[must_use]
    pub const fn opc(self) -> u32 {
        self as u32
    }

    /// Returns `true` for the flag-setting variants.
    #[must_use]
    pub const fn sets_flags(self) -> bool {
        matches!(self, Self::Adds | Self::Subs)
    }

    /// Returns `true` for subtraction.
    #[must_use]
    pub const fn is_subtract(self) -> bool {
        matches!(self, Self::Sub | Self::Subs)
    }

    /// Returns the assembler mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Adds => "adds",
            Self::Sub => "sub",
            Self::Subs => "subs",
        }
    }
}

/// Wide-move operations selected by `opc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WideMoveOp {
    /// `movn`
    Movn = 0b00,
    /// `movz`
    Movz = 0b10,
    /// `movk`
    Movk = 0b11,
}

impl WideMoveOp {
    /// Decodes the two-bit `opc` field; `01` is unallocated.
    #[must_use]
    pub const fn from_opc(opc: u32) -> Option<Self> {
        match opc & 0b11 {
            0b00 => Some(Self::Movn),
            0b10 => Some(Self::Movz),
            0b11 => Some(Self::Movk),
            _ => None,
        }
    }

    /// Returns the `opc` encoding.
    #[must_use]
    pub const fn opc(self) -> u32 {
        self as u32
    }

    /// Returns the assembler mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Movn => "movn",
            Self::Movz => "movz",
            Self::Movk => "movk",
        }
    }
}

/// Bitwise operations selected by `opc`; the `N` bit negates the second operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LogicalOp {
    /// `and` / `bic`
    And = 0b00,
    /// `orr` / `orn`
    Orr = 0b01,
    /// `eor` / `eon`
    Eor = 0b10,
    /// `ands` / `bics`
    Ands = 0b11,
}

impl LogicalOp {
    /// Decodes the two-bit `opc` field.
    #[must_use]
    pub const fn from_opc(opc: u32) -> Self {
        match opc & 0b11 {
            0b00 => Self::And,
            0b01 => Self::Orr,
            0b10 => Self::Eor,
            _ => Self::Ands,
        }
    }

    /// Returns the `opc` encoding.
    #[must_use]
    pub const fn opc(self) -> u32 {
        self as u32
    }

    /// Returns `true` for `ands`/`bics`.
    #[must_use]
    pub const fn sets_flags(self) -> bool {
        matches!(self, Self::Ands)
    }

    /// Returns the assembler mnemonic for the plain or negated form.
    #[must_use]
    pub const fn mnemonic(self, negate: bool) -> &'static str {
        match (self, negate) {
            (Self::And, false) => "and",
            (Self::And, true) => "bic",
            (Self::Orr, false) => "orr",
            (Self::Orr, true) => "orn",
            (Self::Eor, false) => "eor",
            (Self::Eor, true) => "eon",
            (Self::Ands, false) => "ands",
            (Self::Ands, true) => "bics",
        }
    }
}

/// Immediate data-processing operand layouts, selected by `opi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DpImmOperation {
    /// `opi = 010`: add/subtract a 12-bit immediate.
    Arithmetic {
        /// Operation.
        op: ArithmeticOp,
        /// Shift the immediate left by 12.
        shift12: bool,
        /// Unsigned 12-bit immediate.
        imm12: u16,
        /// First operand.
        rn: Register,
    },
    /// `opi = 101`: move a 16-bit immediate into lane `hw`.
    WideMove {
        /// Operation.
        op: WideMoveOp,
        /// Lane index; the immediate is shifted by `16 * hw`.
        hw: u8,
        /// Unsigned 16-bit immediate.
        imm16: u16,
    },
}

/// Data processing with an immediate operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DpImmediate {
    /// 64-bit operation when set.
    pub sf: bool,
    /// Destination register.
    pub rd: Register,
    /// Operand layout.
    pub operation: DpImmOperation,
}

impl DpImmediate {
    const OPI_ARITHMETIC: u32 = 0b010;
    const OPI_WIDE_MOVE: u32 = 0b101;

    fn decode(word: u32) -> Option<Self> {
        let sf = bit(word, 31);
        let opc = bits(word, 29, 2);
        let rd = Register::from_field(bits(word, 0, 5));
        let operation = match bits(word, 23, 3) {
            Self::OPI_ARITHMETIC => DpImmOperation::Arithmetic {
                op: ArithmeticOp::from_opc(opc),
                shift12: bit(word, 22),
                imm12: narrow16(bits(word, 10, 12)),
                rn: Register::from_field(bits(word, 5, 5)),
            },
            Self::OPI_WIDE_MOVE => {
                let hw = bits(word, 21, 2);
                if !sf && hw > 1 {
                    return None;
                }
                DpImmOperation::WideMove {
                    op: WideMoveOp::from_opc(opc)?,
                    hw: narrow8(hw),
                    imm16: narrow16(bits(word, 5, 16)),
                }
            }
            _ => return None,
        };
        Some(Self { sf, rd, operation })
    }

    /// Packs the instruction into its 32-bit word.
    #[must_use]
    pub fn encode(&self) -> u32 {
        let head = (u32::from(self.sf) << 31) | (0b100 << 26) | self.rd.field();
        match self.operation {
            DpImmOperation::Arithmetic {
                op,
                shift12,
                imm12,
                rn,
            } => {
                head | (op.opc() << 29)
                    | (Self::OPI_ARITHMETIC << 23)
                    | (u32::from(shift12) << 22)
                    | ((u32::from(imm12) & 0xFFF) << 10)
                    | (rn.field() << 5)
            }
            DpImmOperation::WideMove { op, hw, imm16 } => {
                head | (op.opc() << 29)
                    | (Self::OPI_WIDE_MOVE << 23)
                    | ((u32::from(hw) & 0b11) << 21)
                    | (u32::from(imm16) << 5)
            }
        }
    }
}

/// Register data-processing operand layouts, selected by `M` and `opr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DpRegOperation {
    /// Add/subtract with a shifted register.
    Arithmetic {
        /// Operation.
        op: ArithmeticOp,
        /// Shift applied to `rm` (never `ROR`).
        shift: ShiftType,
        /// Shift amount (`imm6`).
        amount: u8,
    },
    /// Bitwise operation with a shifted, optionally negated register.
    Logical {
        /// Operation.
        op: LogicalOp,
        /// Complement the shifted `rm` (`N` bit).
        negate: bool,
        /// Shift applied to `rm`.
        shift: ShiftType,
        /// Shift amount (`imm6`).
        amount: u8,
    },
    /// `ra ± rn * rm`.
    Multiply {
        /// `msub` when set, `madd` otherwise.
        subtract: bool,
        /// Accumulator register.
        ra: Register,
    },
}

/// Data processing with register operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DpRegister {
    /// 64-bit operation when set.
    pub sf: bool,
    /// Destination register.
    pub rd: Register,
    /// First operand.
    pub rn: Register,
    /// Second operand.
    pub rm: Register,
    /// Operand layout.
    pub operation: DpRegOperation,
}

impl DpRegister {
    const OPR_MULTIPLY: u32 = 0b1000;

    fn decode(word: u32) -> Option<Self> {
        let sf = bit(word, 31);
        let opc = bits(word, 29, 2);
        let opr = bits(word, 21, 4);
        let operand = bits(word, 10, 6);
        let rd = Register::from_field(bits(word, 0, 5));
        let rn = Register::from_field(bits(word, 5, 5));
        let rm = Register::from_field(bits(word, 16, 5));

        let operation = if bit(word, 28) {
            if opr != Self::OPR_MULTIPLY || opc != 0 {
                return None;
            }
            DpRegOperation::Multiply {
                subtract: bit(operand, 5),
                ra: Register::from_field(operand),
            }
        } else {
            if !sf && operand >= 32 {
                return None;
            }
            let shift = ShiftType::from_u2(opr >> 1);
            let amount = narrow8(operand);
            if opr & 0b1000 != 0 {
                if opr & 1 != 0 || shift == ShiftType::Ror {
                    return None;
                }
                DpRegOperation::Arithmetic {
                    op: ArithmeticOp::from_opc(opc),
                    shift,
                    amount,
                }
            } else {
                DpRegOperation::Logical {
                    op: LogicalOp::from_opc(opc),
                    negate: opr & 1 != 0,
                    shift,
                    amount,
                }
            }
        };

        Some(Self {
            sf,
            rd,
            rn,
            rm,
            operation,
        })
    }

    /// Packs the instruction into its 32-bit word.
    #[must_use]
    pub fn encode(&self) -> u32 {
        let (opc, m, opr, operand) = match self.operation {
            DpRegOperation::Arithmetic { op, shift, amount } => (
                op.opc(),
                0,
                0b1000 | (shift.as_u2() << 1),
                u32::from(amount),
            ),
            DpRegOperation::Logical {
                op,
                negate,
                shift,
                amount,
            } => (
                op.opc(),
                0,
                (shift.as_u2() << 1) | u32::from(negate),
                u32::from(amount),
            ),
            DpRegOperation::Multiply { subtract, ra } => (
                0,
                1,
                Self::OPR_MULTIPLY,
                (u32::from(subtract) << 5) | ra.field(),
            ),
        };
        (u32::from(self.sf) << 31)
            | (opc << 29)
            | (m << 28)
            | (0b101 << 25)
            | (opr << 21)
            | (self.rm.field() << 16)
            | ((operand & 0x3F) << 10)
            | (self.rn.field() << 5)
            | self.rd.field()
    }
}

/// Offset forms of a single data transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferOffset {
    /// `[xn, #imm]`: `imm12` scaled by the access size.
    Unsigned {
        /// Unscaled 12-bit field.
        imm12: u16,
    },
    /// `[xn, #simm]!`: base updated before the access.
    PreIndexed {
        /// Signed byte offset.
        simm9: i16,
    },
    /// `[xn], #simm`: base updated after the access.
    PostIndexed {
        /// Signed byte offset.
        simm9: i16,
    },
    /// `[xn, xm]`.
    Register {
        /// Offset register.
        xm: Register,
    },
}

/// Load or store addressed through a base register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SingleDataTransfer {
    /// 64-bit transfer when set.
    pub sf: bool,
    /// Load when set, store otherwise.
    pub load: bool,
    /// Transfer register.
    pub rt: Register,
    /// Base register.
    pub xn: Register,
    /// Offset form.
    pub offset: TransferOffset,
}

impl SingleDataTransfer {
    const REGISTER_OFFSET_TAIL: u32 = 0b01_1010;

    fn decode(word: u32) -> Option<Self> {
        if bits(word, 25, 5) != 0b11100 || bit(word, 23) {
            return None;
        }
        let offset = if bit(word, 24) {
            TransferOffset::Unsigned {
                imm12: narrow16(bits(word, 10, 12)),
            }
        } else if bit(word, 21) {
            if bits(word, 10, 6) != Self::REGISTER_OFFSET_TAIL {
                return None;
            }
            TransferOffset::Register {
                xm: Register::from_field(bits(word, 16, 5)),
            }
        } else {
            if !bit(word, 10) {
                return None;
            }
            let simm9 = narrow_signed16(sign_extend(u64::from(bits(word, 12, 9)), 9));
            if bit(word, 11) {
                TransferOffset::PreIndexed { simm9 }
            } else {
                TransferOffset::PostIndexed { simm9 }
            }
        };
        Some(Self {
            sf: bit(word, 30),
            load: bit(word, 22),
            rt: Register::from_field(bits(word, 0, 5)),
            xn: Register::from_field(bits(word, 5, 5)),
            offset,
        })
    }

    /// Packs the instruction into its 32-bit word.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn encode(&self) -> u32 {
        let (unsigned, offset) = match self.offset {
            TransferOffset::Unsigned { imm12 } => (1, u32::from(imm12) & 0xFFF),
            TransferOffset::Register { xm } => {
                (0, (1 << 11) | (xm.field() << 6) | Self::REGISTER_OFFSET_TAIL)
            }
            TransferOffset::PreIndexed { simm9 } => (0, ((simm9 as u32 & 0x1FF) << 2) | 0b11),
            TransferOffset::PostIndexed { simm9 } => (0, ((simm9 as u32 & 0x1FF) << 2) | 0b01),
        };
        (1 << 31)
            | (u32::from(self.sf) << 30)
            | (0b11100 << 25)
            | (unsigned << 24)
            | (u32::from(self.load) << 22)
            | (offset << 10)
            | (self.xn.field() << 5)
            | self.rt.field()
    }

    /// Returns the addressing mode that resolves this transfer.
    #[must_use]
    pub const fn addressing_mode(&self) -> AddressingMode {
        match self.offset {
            TransferOffset::Unsigned { imm12: 0 } => AddressingMode::ZeroOffset,
            TransferOffset::Unsigned { .. } => AddressingMode::UnsignedOffset,
            TransferOffset::PreIndexed { .. } => AddressingMode::PreIndexed,
            TransferOffset::PostIndexed { .. } => AddressingMode::PostIndexed,
            TransferOffset::Register { .. } => AddressingMode::RegisterOffset,
        }
    }
}

/// PC-relative literal load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadLiteral {
    /// 64-bit load when set.
    pub sf: bool,
    /// Destination register.
    pub rt: Register,
    /// Signed word offset from the instruction.
    pub simm19: i32,
}

impl LoadLiteral {
    fn decode(word: u32) -> Option<Self> {
        if bits(word, 24, 6) != 0b01_1000 {
            return None;
        }
        Some(Self {
            sf: bit(word, 30),
            rt: Register::from_field(bits(word, 0, 5)),
            simm19: narrow_signed32(sign_extend(u64::from(bits(word, 5, 19)), 19)),
        })
    }

    /// Packs the instruction into its 32-bit word.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn encode(&self) -> u32 {
        (self.sf as u32) << 30
            | (0b01_1000 << 24)
            | ((self.simm19 as u32 & 0x7_FFFF) << 5)
            | self.rt.field()
    }
}

/// Branch forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// `b label`: `PC += 4 * simm26`.
    Unconditional {
        /// Signed word offset.
        simm26: i32,
    },
    /// `br xn`: `PC = xn`.
    Register {
        /// Target register.
        xn: Register,
    },
    /// `b.cond label`: `PC += 4 * simm19` when the condition holds.
    Conditional {
        /// Condition evaluated against the flags.
        cond: Condition,
        /// Signed word offset.
        simm19: i32,
    },
}

impl Branch {
    const UNCONDITIONAL: u32 = 0b00_0101;
    const REGISTER: u32 = 0xD61F_0000;
    const REGISTER_MASK: u32 = 0xFFFF_FC1F;
    const CONDITIONAL: u32 = 0x54;

    fn decode(word: u32) -> Option<Self> {
        if bits(word, 26, 6) == Self::UNCONDITIONAL {
            return Some(Self::Unconditional {
                simm26: narrow_signed32(sign_extend(u64::from(bits(word, 0, 26)), 26)),
            });
        }
        if word & Self::REGISTER_MASK == Self::REGISTER {
            return Some(Self::Register {
                xn: Register::from_field(bits(word, 5, 5)),
            });
        }
        if bits(word, 24, 8) == Self::CONDITIONAL && !bit(word, 4) {
            return Some(Self::Conditional {
                cond: Condition::from_u4(narrow8(bits(word, 0, 4)))?,
                simm19: narrow_signed32(sign_extend(u64::from(bits(word, 5, 19)), 19)),
            });
        }
        None
    }

    /// Packs the instruction into its 32-bit word.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn encode(&self) -> u32 {
        match *self {
            Self::Unconditional { simm26 } => {
                (Self::UNCONDITIONAL << 26) | (simm26 as u32 & 0x3FF_FFFF)
            }
            Self::Register { xn } => Self::REGISTER | (xn.field() << 5),
            Self::Conditional { cond, simm19 } => {
                (Self::CONDITIONAL << 24)
                    | ((simm19 as u32 & 0x7_FFFF) << 5)
                    | cond.as_u4() as u32
            }
        }
    }
}

/// A fully decoded instruction, one variant per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodedInstruction {
    /// Data processing, immediate operand.
    DpImmediate(DpImmediate),
    /// Data processing, register operands.
    DpRegister(DpRegister),
    /// Load/store through a base register.
    SingleDataTransfer(SingleDataTransfer),
    /// PC-relative literal load.
    LoadLiteral(LoadLiteral),
    /// Branch.
    Branch(Branch),
    /// The halt sentinel.
    Halt,
    /// A word outside the supported subset.
    Unknown(u32),
}

impl DecodedInstruction {
    /// Returns the family discriminant.
    #[must_use]
    pub const fn instruction_type(&self) -> InstructionType {
        match self {
            Self::DpImmediate(_) => InstructionType::DpImmediate,
            Self::DpRegister(_) => InstructionType::DpRegister,
            Self::SingleDataTransfer(_) => InstructionType::SingleDataTransfer,
            Self::LoadLiteral(_) => InstructionType::LoadLiteral,
            Self::Branch(_) => InstructionType::Branch,
            Self::Halt => InstructionType::Halt,
            Self::Unknown(_) => InstructionType::Unknown,
        }
    }

    /// Returns the addressing mode for memory-access families.
    #[must_use]
    pub const fn addressing_mode(&self) -> Option<AddressingMode> {
        match self {
            Self::SingleDataTransfer(transfer) => Some(transfer.addressing_mode()),
            Self::LoadLiteral(_) => Some(AddressingMode::LoadLiteral),
            _ => None,
        }
    }

    /// Packs the instruction back into its 32-bit word.
    #[must_use]
    pub fn encode(&self) -> u32 {
        match self {
            Self::DpImmediate(instr) => instr.encode(),
            Self::DpRegister(instr) => instr.encode(),
            Self::SingleDataTransfer(instr) => instr.encode(),
            Self::LoadLiteral(instr) => instr.encode(),
            Self::Branch(instr) => instr.encode(),
            Self::Halt => HALT_WORD,
            Self::Unknown(word) => *word,
        }
    }
}

/// Stateless instruction decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Decodes a raw instruction word.
    ///
    /// Words whose fixed bits or sub-fields fall outside the supported subset
    /// decode to [`DecodedInstruction::Unknown`].
    #[must_use]
    pub fn decode(word: u32) -> DecodedInstruction {
        let decoded = match classify(word) {
            InstructionType::Halt => return DecodedInstruction::Halt,
            InstructionType::DpImmediate => {
                DpImmediate::decode(word).map(DecodedInstruction::DpImmediate)
            }
            InstructionType::DpRegister => {
                DpRegister::decode(word).map(DecodedInstruction::DpRegister)
            }
            InstructionType::SingleDataTransfer => {
                SingleDataTransfer::decode(word).map(DecodedInstruction::SingleDataTransfer)
            }
            InstructionType::LoadLiteral => {
                LoadLiteral::decode(word).map(DecodedInstruction::LoadLiteral)
            }
            InstructionType::Branch => Branch::decode(word).map(DecodedInstruction::Branch),
            InstructionType::Unknown => None,
        };
        decoded.unwrap_or(DecodedInstruction::Unknown(word))
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn narrow8(value: u32) -> u8 {
    value as u8
}

#[allow(clippy::cast_possible_truncation)]
const fn narrow16(value: u32) -> u16 {
    value as u16
}

#[allow(clippy::cast_possible_truncation)]
const fn narrow_signed16(value: i64) -> i16 {
    value as i16
}

#[allow(clippy::cast_possible_truncation)]
const fn narrow_signed32(value: i64) -> i32 {
    value as i32
}

#[cfg(test)]
mod tests {
    use super::{
        ArithmeticOp, Branch, DecodedInstruction, Decoder, DpImmOperation, DpImmediate,
        DpRegOperation, DpRegister, LoadLiteral, LogicalOp, SingleDataTransfer, TransferOffset,
        WideMoveOp,
    };
    use crate::addressing::AddressingMode;
    use crate::encoding::{Condition, InstructionType, HALT_WORD};
    use crate::shift::ShiftType;
    use crate::state::Register;
    use proptest::prelude::*;
    use rstest::rstest;

    fn reg(index: u8) -> Register {
        Register::new(index).expect("valid register index")
    }

    #[test]
    fn halt_word_is_checked_before_classification() {
        assert_eq!(Decoder::decode(HALT_WORD), DecodedInstruction::Halt);
    }

    #[test]
    fn movz_decodes_wide_move_fields() {
        assert_eq!(
            Decoder::decode(0xD280_00A0),
            DecodedInstruction::DpImmediate(DpImmediate {
                sf: true,
                rd: reg(0),
                operation: DpImmOperation::WideMove {
                    op: WideMoveOp::Movz,
                    hw: 0,
                    imm16: 5,
                },
            })
        );
    }

    #[test]
    fn movk_decodes_lane() {
        let DecodedInstruction::DpImmediate(instr) = Decoder::decode(0xF2A2_4680) else {
            panic!("expected immediate data processing");
        };
        assert_eq!(
            instr.operation,
            DpImmOperation::WideMove {
                op: WideMoveOp::Movk,
                hw: 1,
                imm16: 0x1234,
            }
        );
    }

    #[test]
    fn subs_immediate_decodes_shift_bit() {
        assert_eq!(
            Decoder::decode(0xF140_0400),
            DecodedInstruction::DpImmediate(DpImmediate {
                sf: true,
                rd: reg(0),
                operation: DpImmOperation::Arithmetic {
                    op: ArithmeticOp::Subs,
                    shift12: true,
                    imm12: 1,
                    rn: reg(0),
                },
            })
        );
    }

    #[test]
    fn register_arithmetic_and_logical_decode() {
        assert_eq!(
            Decoder::decode(0x8B01_0002),
            DecodedInstruction::DpRegister(DpRegister {
                sf: true,
                rd: reg(2),
                rn: reg(0),
                rm: reg(1),
                operation: DpRegOperation::Arithmetic {
                    op: ArithmeticOp::Add,
                    shift: ShiftType::Lsl,
                    amount: 0,
                },
            })
        );
        assert_eq!(
            Decoder::decode(0x8A22_0020),
            DecodedInstruction::DpRegister(DpRegister {
                sf: true,
                rd: reg(0),
                rn: reg(1),
                rm: reg(2),
                operation: DpRegOperation::Logical {
                    op: LogicalOp::And,
                    negate: true,
                    shift: ShiftType::Lsl,
                    amount: 0,
                },
            })
        );
    }

    #[test]
    fn multiply_decodes_accumulator() {
        assert_eq!(
            Decoder::decode(0x9B02_7C20),
            DecodedInstruction::DpRegister(DpRegister {
                sf: true,
                rd: reg(0),
                rn: reg(1),
                rm: reg(2),
                operation: DpRegOperation::Multiply {
                    subtract: false,
                    ra: Register::ZR,
                },
            })
        );
    }

    #[rstest]
    #[case(0xF940_0020, TransferOffset::Unsigned { imm12: 0 }, true, AddressingMode::ZeroOffset)]
    #[case(
        0xF940_0420,
        TransferOffset::Unsigned { imm12: 1 },
        true,
        AddressingMode::UnsignedOffset
    )]
    #[case(
        0xF841_0420,
        TransferOffset::PostIndexed { simm9: 16 },
        true,
        AddressingMode::PostIndexed
    )]
    #[case(
        0xF862_6820,
        TransferOffset::Register { xm: Register::from_field(2) },
        true,
        AddressingMode::RegisterOffset
    )]
    #[case(
        0xF81F_8C20,
        TransferOffset::PreIndexed { simm9: -8 },
        false,
        AddressingMode::PreIndexed
    )]
    fn transfer_offsets_decode(
        #[case] word: u32,
        #[case] offset: TransferOffset,
        #[case] load: bool,
        #[case] mode: AddressingMode,
    ) {
        let decoded = Decoder::decode(word);
        assert_eq!(
            decoded,
            DecodedInstruction::SingleDataTransfer(SingleDataTransfer {
                sf: true,
                load,
                rt: reg(0),
                xn: reg(1),
                offset,
            })
        );
        assert_eq!(decoded.addressing_mode(), Some(mode));
        assert_eq!(decoded.encode(), word);
    }

    #[test]
    fn transfer_and_literal_split_on_bit_31() {
        assert_eq!(
            Decoder::decode(0xB940_0020).instruction_type(),
            InstructionType::SingleDataTransfer
        );
        assert_eq!(
            Decoder::decode(0x1800_0040),
            DecodedInstruction::LoadLiteral(LoadLiteral {
                sf: false,
                rt: reg(0),
                simm19: 2,
            })
        );
        assert_eq!(
            Decoder::decode(0x58FF_FFE0),
            DecodedInstruction::LoadLiteral(LoadLiteral {
                sf: true,
                rt: reg(0),
                simm19: -1,
            })
        );
    }

    #[rstest]
    #[case(0x1400_0002, Branch::Unconditional { simm26: 2 })]
    #[case(0x17FF_FFFF, Branch::Unconditional { simm26: -1 })]
    #[case(0xD61F_0020, Branch::Register { xn: Register::from_field(1) })]
    #[case(0x5400_0040, Branch::Conditional { cond: Condition::Eq, simm19: 2 })]
    #[case(0x54FF_FFED, Branch::Conditional { cond: Condition::Le, simm19: -1 })]
    fn branches_decode(#[case] word: u32, #[case] expected: Branch) {
        assert_eq!(Decoder::decode(word), DecodedInstruction::Branch(expected));
        assert_eq!(expected.encode(), word);
    }

    #[rstest]
    #[case::zero(0x0000_0000)]
    #[case::wide_move_opc_01(0xB280_0000)]
    #[case::narrow_wide_move_hw_2(0x52C0_0000)]
    #[case::arithmetic_with_ror(0x8BC1_0002)]
    #[case::narrow_shift_amount_32(0x0B01_8002)]
    #[case::conditional_unsupported_cond(0x5400_0042)]
    #[case::simd_transfer(0xFD40_0020)]
    #[case::register_offset_bad_option(0xF862_4820)]
    fn unsupported_words_decode_as_unknown(#[case] word: u32) {
        assert_eq!(Decoder::decode(word), DecodedInstruction::Unknown(word));
        assert_eq!(Decoder::decode(word).addressing_mode(), None);
    }

    fn any_register() -> impl Strategy<Value = Register> {
        (0u32..32).prop_map(Register::from_field)
    }

    proptest! {
        #[test]
        fn arithmetic_immediate_roundtrips(
            sf in any::<bool>(),
            opc in 0u32..4,
            shift12 in any::<bool>(),
            imm12 in 0u16..4096,
            rn in any_register(),
            rd in any_register(),
        ) {
            let instr = DpImmediate {
                sf,
                rd,
                operation: DpImmOperation::Arithmetic {
                    op: ArithmeticOp::from_opc(opc),
                    shift12,
                    imm12,
                    rn,
                },
            };
            prop_assert_eq!(
                Decoder::decode(instr.encode()),
                DecodedInstruction::DpImmediate(instr)
            );
        }

        #[test]
        fn logical_register_roundtrips(
            opc in 0u32..4,
            negate in any::<bool>(),
            shift in 0u32..4,
            amount in 0u8..64,
            rd in any_register(),
            rn in any_register(),
            rm in any_register(),
        ) {
            let instr = DpRegister {
                sf: true,
                rd,
                rn,
                rm,
                operation: DpRegOperation::Logical {
                    op: LogicalOp::from_opc(opc),
                    negate,
                    shift: ShiftType::from_u2(shift),
                    amount,
                },
            };
            let word = instr.encode();
            prop_assume!(word != HALT_WORD);
            prop_assert_eq!(Decoder::decode(word), DecodedInstruction::DpRegister(instr));
        }

        #[test]
        fn indexed_transfer_roundtrips(
            sf in any::<bool>(),
            load in any::<bool>(),
            pre in any::<bool>(),
            simm9 in -256i16..256,
            rt in any_register(),
            xn in any_register(),
        ) {
            let offset = if pre {
                TransferOffset::PreIndexed { simm9 }
            } else {
                TransferOffset::PostIndexed { simm9 }
            };
            let instr = SingleDataTransfer { sf, load, rt, xn, offset };
            prop_assert_eq!(
                Decoder::decode(instr.encode()),
                DecodedInstruction::SingleDataTransfer(instr)
            );
        }

        #[test]
        fn conditional_branch_roundtrips(
            cond_index in 0usize..7,
            simm19 in -(1i32 << 18)..(1i32 << 18),
        ) {
            let instr = Branch::Conditional { cond: Condition::ALL[cond_index], simm19 };
            prop_assert_eq!(Decoder::decode(instr.encode()), DecodedInstruction::Branch(instr));
        }
    }
}
