//! Effective-address computation for loads and stores.

use crate::decoder::{DecodedInstruction, TransferOffset};
use crate::state::ArchitecturalState;
use crate::FaultCode;

/// Addressing forms of the load/store families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AddressingMode {
    /// `[xn]`
    ZeroOffset,
    /// `[xn, #imm]`, immediate scaled by the access size.
    UnsignedOffset,
    /// `[xn, #simm]!`
    PreIndexed,
    /// `[xn], #simm`
    PostIndexed,
    /// `[xn, xm]`
    RegisterOffset,
    /// `label`, PC-relative without a base register.
    LoadLiteral,
}

impl AddressingMode {
    /// Returns `true` when the mode reads a base register.
    #[must_use]
    pub const fn uses_base_register(self) -> bool {
        !matches!(self, Self::LoadLiteral)
    }

    /// Returns `true` when the mode writes the updated address back to the base.
    #[must_use]
    pub const fn writes_back(self) -> bool {
        matches!(self, Self::PreIndexed | Self::PostIndexed)
    }
}

/// Byte scale applied to the unsigned 12-bit offset.
#[must_use]
pub const fn unsigned_offset_scale(sf: bool) -> u64 {
    if sf {
        8
    } else {
        4
    }
}

/// Resolves the effective address of a load or store.
///
/// Pre-indexed writes the updated base before returning it. Post-indexed
/// returns the original base and then writes the updated one. Other modes do
/// not touch registers.
///
/// # Errors
///
/// Returns [`FaultCode::AddressingModeMismatch`] when `mode` cannot be
/// resolved from `decoded`, for example a literal mode with a transfer payload
/// or any non-memory instruction. Registers are left untouched in that case.
#[allow(clippy::cast_sign_loss)]
pub fn resolve(
    arch: &mut ArchitecturalState,
    mode: AddressingMode,
    decoded: &DecodedInstruction,
) -> Result<u64, FaultCode> {
    match (mode, decoded) {
        (AddressingMode::LoadLiteral, DecodedInstruction::LoadLiteral(literal)) => Ok(arch
            .pc()
            .wrapping_add((i64::from(literal.simm19) * 4) as u64)),
        (mode, DecodedInstruction::SingleDataTransfer(transfer)) if mode.uses_base_register() => {
            let base = arch.x(transfer.xn);
            let (address, updated_base) = match (mode, transfer.offset) {
                (AddressingMode::ZeroOffset, TransferOffset::Unsigned { imm12: 0 }) => (base, base),
                (AddressingMode::UnsignedOffset, TransferOffset::Unsigned { imm12 }) => {
                    let offset = u64::from(imm12) * unsigned_offset_scale(transfer.sf);
                    (base.wrapping_add(offset), base)
                }
                (AddressingMode::PreIndexed, TransferOffset::PreIndexed { simm9 }) => {
                    let updated = base.wrapping_add(i64::from(simm9) as u64);
                    (updated, updated)
                }
                (AddressingMode::PostIndexed, TransferOffset::PostIndexed { simm9 }) => {
                    (base, base.wrapping_add(i64::from(simm9) as u64))
                }
                (AddressingMode::RegisterOffset, TransferOffset::Register { xm }) => {
                    (base.wrapping_add(arch.x(xm)), base)
                }
                _ => return Err(mismatch(mode, decoded)),
            };
            if mode.writes_back() {
                arch.write(transfer.xn, true, updated_base);
            }
            Ok(address)
        }
        _ => Err(mismatch(mode, decoded)),
    }
}

fn mismatch(mode: AddressingMode, decoded: &DecodedInstruction) -> FaultCode {
    tracing::error!(?mode, ?decoded, "addressing mode does not match decoded payload");
    FaultCode::AddressingModeMismatch
}
