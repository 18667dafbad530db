//! Instruction disassembly.
//!
//! Output uses the same syntax the assembler accepts, with branch and literal
//! targets rendered as signed byte offsets (`b #-8`).

use std::fmt::Write as _;

use crate::addressing::unsigned_offset_scale;
use crate::decoder::{
    Branch, DecodedInstruction, Decoder, DpImmOperation, DpRegOperation, TransferOffset,
};
use crate::shift::ShiftType;

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// Address of the instruction word.
    pub addr: u64,
    /// Raw instruction word.
    pub raw_word: u32,
    /// Mnemonic (`add`, `b.eq`, `.int` for unknown words).
    pub mnemonic: String,
    /// Formatted operands.
    pub operands: String,
    /// The word is outside the supported subset.
    pub is_unknown: bool,
}

impl DisassemblyRow {
    /// Returns `mnemonic operands` as a single line.
    #[must_use]
    pub fn text(&self) -> String {
        if self.operands.is_empty() {
            self.mnemonic.clone()
        } else {
            format!("{} {}", self.mnemonic, self.operands)
        }
    }
}

fn shift_suffix(kind: ShiftType, amount: u8) -> String {
    if amount == 0 && kind == ShiftType::Lsl {
        String::new()
    } else {
        format!(", {} #{amount}", kind.mnemonic())
    }
}

fn split(instr: &DecodedInstruction) -> (String, String) {
    match instr {
        DecodedInstruction::DpImmediate(dp) => {
            let rd = dp.rd.name(dp.sf);
            match dp.operation {
                DpImmOperation::Arithmetic {
                    op,
                    shift12,
                    imm12,
                    rn,
                } => {
                    let mut operands = format!("{rd}, {}, #{imm12}", rn.name(dp.sf));
                    if shift12 {
                        operands.push_str(", lsl #12");
                    }
                    (op.mnemonic().to_owned(), operands)
                }
                DpImmOperation::WideMove { op, hw, imm16 } => {
                    let mut operands = format!("{rd}, #{imm16:#x}");
                    if hw != 0 {
                        let _ = write!(operands, ", lsl #{}", u32::from(hw) * 16);
                    }
                    (op.mnemonic().to_owned(), operands)
                }
            }
        }
        DecodedInstruction::DpRegister(dp) => {
            let (rd, rn, rm) = (dp.rd.name(dp.sf), dp.rn.name(dp.sf), dp.rm.name(dp.sf));
            match dp.operation {
                DpRegOperation::Arithmetic { op, shift, amount } => (
                    op.mnemonic().to_owned(),
                    format!("{rd}, {rn}, {rm}{}", shift_suffix(shift, amount)),
                ),
                DpRegOperation::Logical {
                    op,
                    negate,
                    shift,
                    amount,
                } => (
                    op.mnemonic(negate).to_owned(),
                    format!("{rd}, {rn}, {rm}{}", shift_suffix(shift, amount)),
                ),
                DpRegOperation::Multiply { subtract, ra } => (
                    if subtract { "msub" } else { "madd" }.to_owned(),
                    format!("{rd}, {rn}, {rm}, {}", ra.name(dp.sf)),
                ),
            }
        }
        DecodedInstruction::SingleDataTransfer(transfer) => {
            let mnemonic = if transfer.load { "ldr" } else { "str" };
            let rt = transfer.rt.name(transfer.sf);
            let xn = transfer.xn.name(true);
            let address = match transfer.offset {
                TransferOffset::Unsigned { imm12: 0 } => format!("[{xn}]"),
                TransferOffset::Unsigned { imm12 } => format!(
                    "[{xn}, #{}]",
                    u64::from(imm12) * unsigned_offset_scale(transfer.sf)
                ),
                TransferOffset::PreIndexed { simm9 } => format!("[{xn}, #{simm9}]!"),
                TransferOffset::PostIndexed { simm9 } => format!("[{xn}], #{simm9}"),
                TransferOffset::Register { xm } => format!("[{xn}, {}]", xm.name(true)),
            };
            (mnemonic.to_owned(), format!("{rt}, {address}"))
        }
        DecodedInstruction::LoadLiteral(literal) => (
            "ldr".to_owned(),
            format!(
                "{}, #{}",
                literal.rt.name(literal.sf),
                i64::from(literal.simm19) * 4
            ),
        ),
        DecodedInstruction::Branch(branch) => match *branch {
            Branch::Unconditional { simm26 } => {
                ("b".to_owned(), format!("#{}", i64::from(simm26) * 4))
            }
            Branch::Register { xn } => ("br".to_owned(), xn.name(true)),
            Branch::Conditional { cond, simm19 } => (
                format!("b.{}", cond.suffix()),
                format!("#{}", i64::from(simm19) * 4),
            ),
        },
        DecodedInstruction::Halt => ("and".to_owned(), "x0, x0, x0".to_owned()),
        DecodedInstruction::Unknown(word) => (".int".to_owned(), format!("{word:#010x}")),
    }
}

/// Renders a decoded instruction as one line of assembly.
#[must_use]
pub fn disassemble(instr: &DecodedInstruction) -> String {
    let (mnemonic, operands) = split(instr);
    if operands.is_empty() {
        mnemonic
    } else {
        format!("{mnemonic} {operands}")
    }
}

/// Decodes and renders a raw instruction word.
#[must_use]
pub fn disassemble_word(word: u32) -> String {
    disassemble(&Decoder::decode(word))
}

/// Disassembles the word at `addr`, or `None` when it is outside `memory`.
#[must_use]
pub fn disassemble_one(addr: u64, memory: &[u8]) -> Option<DisassemblyRow> {
    let start = usize::try_from(addr).ok()?;
    let bytes = memory.get(start..start.checked_add(4)?)?;
    let raw_word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let decoded = Decoder::decode(raw_word);
    let (mnemonic, operands) = split(&decoded);
    Some(DisassemblyRow {
        addr,
        raw_word,
        mnemonic,
        operands,
        is_unknown: matches!(decoded, DecodedInstruction::Unknown(_)),
    })
}

/// Disassembles every whole word of a flat image starting at address 0.
#[must_use]
pub fn disassemble_image(image: &[u8]) -> Vec<DisassemblyRow> {
    (0u64..)
        .step_by(4)
        .take(image.len() / 4)
        .filter_map(|addr| disassemble_one(addr, image))
        .collect()
}
