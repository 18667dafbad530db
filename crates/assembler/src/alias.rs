//! Alias rewriting.
//!
//! Each alias is rebuilt as a fresh canonical operand list and re-dispatched
//! to the canonical encoder, so aliases never pack bits themselves.

use a64_core::{ArithmeticOp, LogicalOp, WideMoveOp};

use crate::mnemonic::{Alias, Mnemonic};
use crate::operand::{Operand, OperandError, RegOperand};

/// Canonical mnemonic and operands produced from an alias.
pub type Rewrite = (Mnemonic, Vec<Operand>);

fn first_register(operands: &[Operand]) -> Result<RegOperand, OperandError> {
    match operands.first() {
        Some(Operand::Register(reg)) => Ok(*reg),
        Some(Operand::Immediate(value)) => Err(OperandError::Expected {
            expected: "register",
            found: format!("immediate #{value}"),
        }),
        Some(_) => Err(OperandError::Expected {
            expected: "register",
            found: "operand".to_string(),
        }),
        None => Err(OperandError::Missing("register")),
    }
}

fn zero_first(reg: RegOperand, operands: &[Operand]) -> Vec<Operand> {
    let mut rewritten = Vec::with_capacity(operands.len() + 1);
    rewritten.push(Operand::Register(RegOperand::zero(reg.sf)));
    rewritten.extend_from_slice(operands);
    rewritten
}

fn zero_second(reg: RegOperand, operands: &[Operand]) -> Vec<Operand> {
    let mut rewritten = Vec::with_capacity(operands.len() + 1);
    rewritten.push(Operand::Register(reg));
    rewritten.push(Operand::Register(RegOperand::zero(reg.sf)));
    rewritten.extend_from_slice(&operands[1..]);
    rewritten
}

fn zero_accumulator(reg: RegOperand, operands: &[Operand]) -> Vec<Operand> {
    let mut rewritten = operands.to_vec();
    rewritten.push(Operand::Register(RegOperand::zero(reg.sf)));
    rewritten
}

/// Rewrites `mov d, #imm` to `movz`, or to `movn` for negative values whose
/// complement fits in 16 bits.
fn move_immediate(reg: RegOperand, value: i64) -> Rewrite {
    let (op, imm) = if value < 0 && (!value) <= 0xFFFF {
        (WideMoveOp::Movn, !value)
    } else {
        (WideMoveOp::Movz, value)
    };
    (
        Mnemonic::WideMove(op),
        vec![Operand::Register(reg), Operand::Immediate(imm)],
    )
}

/// Expands `alias` applied to `operands` into its canonical form.
///
/// The zero register inserted by the rewrite takes the view (X or W) of the
/// first written register operand.
///
/// # Errors
///
/// Returns an [`OperandError`] when the alias has no register operand to take
/// the view from.
pub fn expand_alias(alias: Alias, operands: &[Operand]) -> Result<Rewrite, OperandError> {
    let reg = first_register(operands)?;
    let rewrite = match alias {
        Alias::Cmp => (
            Mnemonic::Arithmetic(ArithmeticOp::Subs),
            zero_first(reg, operands),
        ),
        Alias::Cmn => (
            Mnemonic::Arithmetic(ArithmeticOp::Adds),
            zero_first(reg, operands),
        ),
        Alias::Tst => (
            Mnemonic::Logical {
                op: LogicalOp::Ands,
                negate: false,
            },
            zero_first(reg, operands),
        ),
        Alias::Neg => (
            Mnemonic::Arithmetic(ArithmeticOp::Sub),
            zero_second(reg, operands),
        ),
        Alias::Negs => (
            Mnemonic::Arithmetic(ArithmeticOp::Subs),
            zero_second(reg, operands),
        ),
        Alias::Mvn => (
            Mnemonic::Logical {
                op: LogicalOp::Orr,
                negate: true,
            },
            zero_second(reg, operands),
        ),
        Alias::Mov => match operands.get(1) {
            Some(Operand::Immediate(value)) if operands.len() == 2 => {
                move_immediate(reg, *value)
            }
            _ => (
                Mnemonic::Logical {
                    op: LogicalOp::Orr,
                    negate: false,
                },
                zero_second(reg, operands),
            ),
        },
        Alias::Mul => (
            Mnemonic::Multiply { subtract: false },
            zero_accumulator(reg, operands),
        ),
        Alias::Mneg => (
            Mnemonic::Multiply { subtract: true },
            zero_accumulator(reg, operands),
        ),
    };
    tracing::trace!(?alias, canonical = ?rewrite.0, "alias expanded");
    Ok(rewrite)
}
