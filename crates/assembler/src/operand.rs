//! Operand parsing and the cursor encoders read operands through.

use a64_core::{Register, ShiftType};
use thiserror::Error;

use crate::lexer::{is_valid_label, Token};

/// A register together with the view it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegOperand {
    /// Register index.
    pub reg: Register,
    /// `true` for the X view, `false` for W.
    pub sf: bool,
}

impl RegOperand {
    /// Zero register in the given view.
    #[must_use]
    pub const fn zero(sf: bool) -> Self {
        Self {
            reg: Register::ZR,
            sf,
        }
    }
}

/// Offset part of a bracketed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressOffset {
    /// `[xn]`
    None,
    /// `[xn, #imm]`
    Immediate(i64),
    /// `[xn, xm]`
    Register(RegOperand),
}

/// A bracketed address operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    /// Base register.
    pub base: RegOperand,
    /// Offset inside the brackets.
    pub offset: AddressOffset,
    /// Trailing `!`.
    pub pre_index: bool,
}

/// A parsed operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `x0`, `wzr`
    Register(RegOperand),
    /// `#5`, `#0x10`, or a bare number.
    Immediate(i64),
    /// `lsl #12`
    Shift {
        /// Shift kind.
        kind: ShiftType,
        /// Shift amount as written.
        amount: i64,
    },
    /// `[xn, ...]`
    Address(Address),
    /// Label reference.
    Label(String),
}

impl Operand {
    fn describe(&self) -> String {
        match self {
            Self::Register(_) => "register".to_string(),
            Self::Immediate(value) => format!("immediate #{value}"),
            Self::Shift { kind, .. } => format!("shift '{}'", kind.mnemonic()),
            Self::Address(_) => "address".to_string(),
            Self::Label(name) => format!("label '{name}'"),
        }
    }
}

/// Malformed operand syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperandError {
    /// A token that cannot start or continue an operand.
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    /// `#` followed by something other than a number.
    #[error("invalid immediate '{0}'")]
    InvalidImmediate(String),
    /// Text that is neither a register, number nor label.
    #[error("invalid operand '{0}'")]
    InvalidOperand(String),
    /// A bracketed address that is malformed or unterminated.
    #[error("malformed address: {0}")]
    MalformedAddress(&'static str),
    /// The operand list ended early.
    #[error("missing {0}")]
    Missing(&'static str),
    /// An operand of the wrong kind.
    #[error("expected {expected}, found {found}")]
    Expected {
        /// Required operand kind.
        expected: &'static str,
        /// What was written instead.
        found: String,
    },
    /// More operands than the instruction takes.
    #[error("unexpected trailing {0}")]
    Trailing(String),
}

/// Parses `x0..x30`, `w0..w30`, `xzr` and `wzr`, ignoring case.
#[must_use]
pub fn parse_register(text: &str) -> Option<RegOperand> {
    let lower = text.to_ascii_lowercase();
    let sf = match lower.chars().next()? {
        'x' => true,
        'w' => false,
        _ => return None,
    };
    let rest = &lower[1..];
    if rest == "zr" {
        return Some(RegOperand::zero(sf));
    }
    if rest.is_empty()
        || !rest.bytes().all(|b| b.is_ascii_digit())
        || (rest.len() > 1 && rest.starts_with('0'))
    {
        return None;
    }
    let index: u8 = rest.parse().ok()?;
    if index >= 31 {
        return None;
    }
    Some(RegOperand {
        reg: Register::new(index)?,
        sf,
    })
}

/// Parses a decimal or `0x`-prefixed hex literal, optionally negative.
#[must_use]
pub fn parse_number(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse().ok()?
        }
        None => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenStream<'a> {
    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn immediate(&mut self) -> Result<i64, OperandError> {
        match self.next() {
            Some(Token::Word(text)) => {
                parse_number(text).ok_or_else(|| OperandError::InvalidImmediate(text.clone()))
            }
            Some(other) => Err(OperandError::InvalidImmediate(other.text().to_string())),
            None => Err(OperandError::Missing("immediate after '#'")),
        }
    }

    fn address(&mut self) -> Result<Address, OperandError> {
        let base = match self.next() {
            Some(Token::Word(text)) => parse_register(text)
                .ok_or(OperandError::MalformedAddress("base must be a register"))?,
            _ => return Err(OperandError::MalformedAddress("missing base register")),
        };
        let offset = match self.next() {
            Some(Token::RBracket) => AddressOffset::None,
            Some(Token::Comma) => {
                let offset = match self.next() {
                    Some(Token::Hash) => AddressOffset::Immediate(self.immediate()?),
                    Some(Token::Word(text)) => {
                        AddressOffset::Register(parse_register(text).ok_or(
                            OperandError::MalformedAddress("offset must be #imm or a register"),
                        )?)
                    }
                    _ => return Err(OperandError::MalformedAddress("missing offset")),
                };
                if self.next() != Some(&Token::RBracket) {
                    return Err(OperandError::MalformedAddress("expected ']'"));
                }
                offset
            }
            _ => return Err(OperandError::MalformedAddress("expected ']' or ','")),
        };
        let pre_index = self.peek() == Some(&Token::Bang);
        if pre_index {
            self.pos += 1;
        }
        Ok(Address {
            base,
            offset,
            pre_index,
        })
    }

    fn word(&mut self, text: &str) -> Result<Operand, OperandError> {
        if let Some(reg) = parse_register(text) {
            return Ok(Operand::Register(reg));
        }
        if let Some(kind) = ShiftType::from_mnemonic(text) {
            if self.peek() == Some(&Token::Hash) {
                self.pos += 1;
                return Ok(Operand::Shift {
                    kind,
                    amount: self.immediate()?,
                });
            }
        }
        if let Some(value) = parse_number(text) {
            return Ok(Operand::Immediate(value));
        }
        if is_valid_label(text) {
            return Ok(Operand::Label(text.to_string()));
        }
        Err(OperandError::InvalidOperand(text.to_string()))
    }
}

/// Parses the operand tokens that follow a mnemonic.
///
/// # Errors
///
/// Returns an [`OperandError`] for malformed immediates, addresses or
/// unrecognised text.
pub fn parse_operands(tokens: &[Token]) -> Result<Vec<Operand>, OperandError> {
    let mut stream = TokenStream { tokens, pos: 0 };
    let mut operands = Vec::new();
    while let Some(token) = stream.next() {
        let operand = match token {
            Token::Comma => continue,
            Token::Hash => Operand::Immediate(stream.immediate()?),
            Token::LBracket => Operand::Address(stream.address()?),
            Token::Word(text) => stream.word(text)?,
            Token::RBracket | Token::Bang => {
                return Err(OperandError::UnexpectedToken(token.text().to_string()))
            }
        };
        operands.push(operand);
    }
    Ok(operands)
}

/// Sequential reader over an instruction's operands.
#[derive(Debug, Clone)]
pub struct Operands<'a> {
    items: &'a [Operand],
    pos: usize,
}

impl<'a> Operands<'a> {
    /// Starts reading at the first operand.
    #[must_use]
    pub const fn new(items: &'a [Operand]) -> Self {
        Self { items, pos: 0 }
    }

    /// Next operand without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&'a Operand> {
        self.items.get(self.pos)
    }

    /// Consumes and returns the next operand.
    ///
    /// # Errors
    ///
    /// Returns [`OperandError::Missing`] when the list is exhausted.
    pub fn next(&mut self, what: &'static str) -> Result<&'a Operand, OperandError> {
        let operand = self.items.get(self.pos).ok_or(OperandError::Missing(what))?;
        self.pos += 1;
        Ok(operand)
    }

    /// Consumes a register operand.
    ///
    /// # Errors
    ///
    /// Returns an error when the next operand is missing or not a register.
    pub fn register(&mut self, what: &'static str) -> Result<RegOperand, OperandError> {
        match self.next(what)? {
            Operand::Register(reg) => Ok(*reg),
            other => Err(OperandError::Expected {
                expected: what,
                found: other.describe(),
            }),
        }
    }

    /// Consumes an immediate operand.
    ///
    /// # Errors
    ///
    /// Returns an error when the next operand is missing or not an immediate.
    pub fn immediate(&mut self, what: &'static str) -> Result<i64, OperandError> {
        match self.next(what)? {
            Operand::Immediate(value) => Ok(*value),
            other => Err(OperandError::Expected {
                expected: what,
                found: other.describe(),
            }),
        }
    }

    /// Consumes an optional trailing `lsl #n` style shift.
    ///
    /// # Errors
    ///
    /// Returns an error when a non-shift operand follows.
    pub fn optional_shift(&mut self) -> Result<Option<(ShiftType, i64)>, OperandError> {
        match self.peek() {
            None => Ok(None),
            Some(Operand::Shift { kind, amount }) => {
                self.pos += 1;
                Ok(Some((*kind, *amount)))
            }
            Some(other) => Err(OperandError::Expected {
                expected: "shift",
                found: other.describe(),
            }),
        }
    }

    /// Fails if any operand is left unread.
    ///
    /// # Errors
    ///
    /// Returns [`OperandError::Trailing`] naming the first extra operand.
    pub fn finish(&self) -> Result<(), OperandError> {
        self.peek()
            .map_or(Ok(()), |extra| Err(OperandError::Trailing(extra.describe())))
    }
}
