//! Symbol table and pass-1 address assignment.
//!
//! Pass 1 walks the parsed lines, records every label at the running address
//! and advances the address by one word for each line that carries an
//! instruction or directive. Label-only lines take no space.

use std::collections::HashMap;

use a64_core::{INSTRUCTION_BYTES, MEMORY_SIZE};
use thiserror::Error;

use crate::lexer::is_valid_label;

/// A label with its assigned address and definition line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Address the label refers to.
    pub address: u32,
    /// Source line where the label was defined.
    pub defined_at: usize,
}

/// Mapping from label name to definition. Names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name` at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolErrorKind::DuplicateLabel`] if `name` is already
    /// defined and [`SymbolErrorKind::InvalidLabel`] for malformed names.
    pub fn define(&mut self, name: &str, address: u32, line: usize) -> Result<(), SymbolError> {
        if !is_valid_label(name) {
            return Err(SymbolError {
                kind: SymbolErrorKind::InvalidLabel(name.to_string()),
                line,
            });
        }
        if let Some(existing) = self.symbols.get(name) {
            return Err(SymbolError {
                kind: SymbolErrorKind::DuplicateLabel {
                    name: name.to_string(),
                    first_definition: existing.defined_at,
                },
                line,
            });
        }
        self.symbols.insert(
            name.to_string(),
            Symbol {
                address,
                defined_at: line,
            },
        );
        Ok(())
    }

    /// Looks up a label.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }

    /// Address of a label, if defined.
    #[must_use]
    pub fn address_of(&self, name: &str) -> Option<u32> {
        self.get(name).map(|symbol| symbol.address)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` when no labels are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Labels sorted by address, then name.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, Symbol)> {
        let mut entries: Vec<_> = self
            .symbols
            .iter()
            .map(|(name, symbol)| (name.as_str(), *symbol))
            .collect();
        entries.sort_by(|a, b| a.1.address.cmp(&b.1.address).then(a.0.cmp(b.0)));
        entries
    }
}

/// Error during symbol table construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct SymbolError {
    /// Kind of error.
    pub kind: SymbolErrorKind,
    /// Source line where the error occurred.
    pub line: usize,
}

/// Classification of symbol errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolErrorKind {
    /// Duplicate label definition.
    #[error("duplicate label '{name}' (first defined at line {first_definition})")]
    DuplicateLabel {
        /// The label name.
        name: String,
        /// Line of the first definition.
        first_definition: usize,
    },
    /// Label text that is not a valid identifier.
    #[error("invalid label name '{0}'")]
    InvalidLabel(String),
    /// The program no longer fits in emulator memory.
    #[error("address {address:#x} is past the end of emulator memory")]
    AddressOverflow {
        /// First address that does not fit.
        address: u64,
    },
}

/// One line's contribution to pass 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineShape<'a> {
    /// 1-indexed source line.
    pub line: usize,
    /// Labels declared on the line.
    pub labels: &'a [String],
    /// The line emits a word.
    pub emits: bool,
}

/// Result of pass-1 address assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Address of each input line, in input order.
    pub addresses: Vec<u32>,
    /// Label definitions.
    pub symbols: SymbolTable,
    /// One past the last emitted byte.
    pub end_address: u32,
}

/// Performs pass-1 address assignment.
///
/// # Errors
///
/// Returns a [`SymbolError`] if a label is defined twice or is malformed, or
/// if the program outgrows emulator memory.
#[allow(clippy::cast_possible_truncation)]
pub fn assign_addresses<'a>(
    lines: impl IntoIterator<Item = LineShape<'a>>,
) -> Result<Assignment, SymbolError> {
    let mut symbols = SymbolTable::new();
    let mut addresses = Vec::new();
    let mut address: u64 = 0;

    for shape in lines {
        for label in shape.labels {
            symbols.define(label, address as u32, shape.line)?;
        }
        addresses.push(address as u32);
        if shape.emits {
            address += INSTRUCTION_BYTES;
            if address > MEMORY_SIZE as u64 {
                return Err(SymbolError {
                    kind: SymbolErrorKind::AddressOverflow { address },
                    line: shape.line,
                });
            }
        }
    }

    tracing::debug!(
        labels = symbols.len(),
        end = address,
        "pass 1 assigned addresses"
    );
    Ok(Assignment {
        addresses,
        symbols,
        end_address: address as u32,
    })
}
