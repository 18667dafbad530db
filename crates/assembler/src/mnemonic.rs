//! Mnemonic table.
//!
//! Canonical mnemonics map onto the operation enums of `a64-core`, so the
//! names here are checked against the names the disassembler prints.

use a64_core::{ArithmeticOp, Condition, LogicalOp, WideMoveOp};

/// Alias mnemonics rewritten to a canonical form before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alias {
    /// `cmp a, b` → `subs zr, a, b`
    Cmp,
    /// `cmn a, b` → `adds zr, a, b`
    Cmn,
    /// `neg d, b` → `sub d, zr, b`
    Neg,
    /// `negs d, b` → `subs d, zr, b`
    Negs,
    /// `tst a, b` → `ands zr, a, b`
    Tst,
    /// `mvn d, b` → `orn d, zr, b`
    Mvn,
    /// `mov d, rm` → `orr d, zr, rm`; `mov d, #imm` → `movz d, #imm`
    Mov,
    /// `mul d, n, m` → `madd d, n, m, zr`
    Mul,
    /// `mneg d, n, m` → `msub d, n, m, zr`
    Mneg,
}

/// What a mnemonic assembles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// `add`, `adds`, `sub`, `subs` with an immediate or shifted register.
    Arithmetic(ArithmeticOp),
    /// Bitwise register operations; `negate` selects the `bic`/`orn`/`eon`/`bics` forms.
    Logical {
        /// Base operation.
        op: LogicalOp,
        /// Complement the second operand.
        negate: bool,
    },
    /// `movn`, `movz`, `movk`
    WideMove(WideMoveOp),
    /// `madd`, `msub`
    Multiply {
        /// `msub`
        subtract: bool,
    },
    /// `ldr`
    Load,
    /// `str`
    Store,
    /// `b`
    Branch,
    /// `br`
    BranchRegister,
    /// `b.<cond>`
    BranchConditional(Condition),
    /// `.int`
    Int,
    /// Rewritten before encoding.
    Alias(Alias),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MnemonicEntry {
    name: &'static str,
    mnemonic: Mnemonic,
}

const fn entry(name: &'static str, mnemonic: Mnemonic) -> MnemonicEntry {
    MnemonicEntry { name, mnemonic }
}

const fn logical(op: LogicalOp, negate: bool) -> Mnemonic {
    Mnemonic::Logical { op, negate }
}

const MNEMONIC_ENTRIES: &[MnemonicEntry] = &[
    entry("add", Mnemonic::Arithmetic(ArithmeticOp::Add)),
    entry("adds", Mnemonic::Arithmetic(ArithmeticOp::Adds)),
    entry("sub", Mnemonic::Arithmetic(ArithmeticOp::Sub)),
    entry("subs", Mnemonic::Arithmetic(ArithmeticOp::Subs)),
    entry("and", logical(LogicalOp::And, false)),
    entry("bic", logical(LogicalOp::And, true)),
    entry("orr", logical(LogicalOp::Orr, false)),
    entry("orn", logical(LogicalOp::Orr, true)),
    entry("eor", logical(LogicalOp::Eor, false)),
    entry("eon", logical(LogicalOp::Eor, true)),
    entry("ands", logical(LogicalOp::Ands, false)),
    entry("bics", logical(LogicalOp::Ands, true)),
    entry("movn", Mnemonic::WideMove(WideMoveOp::Movn)),
    entry("movz", Mnemonic::WideMove(WideMoveOp::Movz)),
    entry("movk", Mnemonic::WideMove(WideMoveOp::Movk)),
    entry("madd", Mnemonic::Multiply { subtract: false }),
    entry("msub", Mnemonic::Multiply { subtract: true }),
    entry("ldr", Mnemonic::Load),
    entry("str", Mnemonic::Store),
    entry("b", Mnemonic::Branch),
    entry("br", Mnemonic::BranchRegister),
    entry(".int", Mnemonic::Int),
    entry("cmp", Mnemonic::Alias(Alias::Cmp)),
    entry("cmn", Mnemonic::Alias(Alias::Cmn)),
    entry("neg", Mnemonic::Alias(Alias::Neg)),
    entry("negs", Mnemonic::Alias(Alias::Negs)),
    entry("tst", Mnemonic::Alias(Alias::Tst)),
    entry("mvn", Mnemonic::Alias(Alias::Mvn)),
    entry("mov", Mnemonic::Alias(Alias::Mov)),
    entry("mul", Mnemonic::Alias(Alias::Mul)),
    entry("mneg", Mnemonic::Alias(Alias::Mneg)),
];

/// Resolves a mnemonic, ignoring ASCII case.
///
/// Conditional branches are written `b.<cond>` with any supported condition
/// suffix.
#[must_use]
pub fn resolve_mnemonic(name: &str) -> Option<Mnemonic> {
    if let Some(suffix) = name
        .strip_prefix("b.")
        .or_else(|| name.strip_prefix("B."))
    {
        return Condition::from_suffix(suffix).map(Mnemonic::BranchConditional);
    }
    MNEMONIC_ENTRIES
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| entry.mnemonic)
}
