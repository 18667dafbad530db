//! Load and store execution.

use crate::addressing::{resolve, AddressingMode};
use crate::decoder::DecodedInstruction;
use crate::memory::{decode_memory_region, MemoryRegion};
use crate::{CoreState, FaultCode, MmioBus};

/// Loads 4 or 8 bytes into the transfer register.
///
/// Handles both base-register transfers and literal loads. Index writeback
/// performed by the resolver stays in effect even when the access faults.
///
/// # Errors
///
/// Returns [`FaultCode::MemoryOutOfBounds`] when the addressed bytes are
/// outside memory (the register is left untouched) and
/// [`FaultCode::AddressingModeMismatch`] when `decoded` is not a load.
pub fn execute_ldr(
    state: &mut CoreState,
    mode: AddressingMode,
    decoded: &DecodedInstruction,
) -> Result<(), FaultCode> {
    let (rt, sf) = match decoded {
        DecodedInstruction::SingleDataTransfer(transfer) if transfer.load => {
            (transfer.rt, transfer.sf)
        }
        DecodedInstruction::LoadLiteral(literal) => (literal.rt, literal.sf),
        _ => return Err(FaultCode::AddressingModeMismatch),
    };
    let addr = resolve(&mut state.arch, mode, decoded)?;
    let value = if sf {
        state.memory.read_u64(addr)?
    } else {
        u64::from(state.memory.read_u32(addr)?)
    };
    state.arch.write(rt, sf, value);
    Ok(())
}

/// Stores 4 or 8 bytes from the transfer register.
///
/// Stores into the GPIO window go to `mmio` instead of memory; a 64-bit store
/// becomes two 32-bit peripheral writes, low word first. A store that starts
/// in the window must also end in it, otherwise nothing is written.
///
/// # Errors
///
/// Returns [`FaultCode::MemoryOutOfBounds`] when the addressed bytes are
/// outside memory or leave the GPIO window, [`FaultCode::MmioWriteFailed`] when the peripheral rejects
/// the write and [`FaultCode::AddressingModeMismatch`] when `decoded` is not a
/// store.
#[allow(clippy::cast_possible_truncation)]
pub fn execute_str(
    state: &mut CoreState,
    mmio: &mut dyn MmioBus,
    mode: AddressingMode,
    decoded: &DecodedInstruction,
) -> Result<(), FaultCode> {
    let DecodedInstruction::SingleDataTransfer(transfer) = decoded else {
        return Err(FaultCode::AddressingModeMismatch);
    };
    if transfer.load {
        return Err(FaultCode::AddressingModeMismatch);
    }
    let addr = resolve(&mut state.arch, mode, decoded)?;
    let value = state.arch.read(transfer.rt, transfer.sf);

    if decode_memory_region(addr) == MemoryRegion::Gpio {
        let width: u64 = if transfer.sf { 8 } else { 4 };
        let last = addr.wrapping_add(width - 1);
        if !MemoryRegion::Gpio.contains(last) {
            tracing::warn!(addr, width, "store runs past the gpio window");
            return Err(FaultCode::MemoryOutOfBounds);
        }
        let mut words = vec![(addr, value as u32)];
        if transfer.sf {
            words.push((addr.wrapping_add(4), (value >> 32) as u32));
        }
        for (word_addr, word) in words {
            mmio.write32(word_addr, word).map_err(|err| {
                tracing::warn!(addr = word_addr, %err, "peripheral rejected store");
                FaultCode::MmioWriteFailed
            })?;
        }
        return Ok(());
    }

    if transfer.sf {
        state.memory.write_u64(addr, value)
    } else {
        state.memory.write_u32(addr, value as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::{execute_ldr, execute_str};
    use crate::addressing::AddressingMode;
    use crate::api::{MmioError, MmioWriteResult};
    use crate::decoder::{DecodedInstruction, LoadLiteral, SingleDataTransfer, TransferOffset};
    use crate::memory::{GPIO_END, GPIO_START, MEMORY_SIZE};
    use crate::state::Register;
    use crate::{CoreState, FaultCode, MmioBus, NullMmio};

    #[derive(Default)]
    struct RecordingMmio {
        writes: Vec<(u64, u32)>,
        fail: bool,
    }

    impl MmioBus for RecordingMmio {
        fn write32(&mut self, addr: u64, value: u32) -> Result<MmioWriteResult, MmioError> {
            if self.fail {
                return Err(MmioError::WriteFailed);
            }
            self.writes.push((addr, value));
            Ok(MmioWriteResult::Applied)
        }
    }

    fn reg(index: u8) -> Register {
        Register::new(index).expect("valid register index")
    }

    fn transfer(sf: bool, load: bool, offset: TransferOffset) -> DecodedInstruction {
        DecodedInstruction::SingleDataTransfer(SingleDataTransfer {
            sf,
            load,
            rt: reg(0),
            xn: reg(1),
            offset,
        })
    }

    #[test]
    fn store_then_load_roundtrips_both_widths() {
        let mut state = CoreState::new();
        state.arch.write(reg(1), true, 0x100);
        state.arch.write(reg(0), true, 0x1122_3344_5566_7788);
        let zero = TransferOffset::Unsigned { imm12: 0 };

        execute_str(
            &mut state,
            &mut NullMmio,
            AddressingMode::ZeroOffset,
            &transfer(true, false, zero),
        )
        .expect("store in bounds");
        assert_eq!(state.memory.read_u64(0x100), Ok(0x1122_3344_5566_7788));

        state.arch.write(reg(0), true, 0);
        execute_ldr(
            &mut state,
            AddressingMode::ZeroOffset,
            &transfer(false, true, zero),
        )
        .expect("load in bounds");
        assert_eq!(state.arch.x(reg(0)), 0x5566_7788);
    }

    #[test]
    fn narrow_store_writes_four_bytes() {
        let mut state = CoreState::new();
        state.arch.write(reg(1), true, 0x200);
        state.arch.write(reg(0), true, u64::MAX);
        execute_str(
            &mut state,
            &mut NullMmio,
            AddressingMode::UnsignedOffset,
            &transfer(false, false, TransferOffset::Unsigned { imm12: 1 }),
        )
        .expect("store in bounds");
        assert_eq!(state.memory.read_u32(0x204), Ok(0xFFFF_FFFF));
        assert_eq!(state.memory.read_u32(0x208), Ok(0));
    }

    #[test]
    fn literal_load_reads_relative_to_pc() {
        let mut state = CoreState::new();
        state.arch.set_pc(0x10);
        state.memory.write_u64(0x18, 0xCAFE_F00D_0000_0001).expect("in bounds");
        let literal = DecodedInstruction::LoadLiteral(LoadLiteral {
            sf: true,
            rt: reg(5),
            simm19: 2,
        });
        execute_ldr(&mut state, AddressingMode::LoadLiteral, &literal).expect("in bounds");
        assert_eq!(state.arch.x(reg(5)), 0xCAFE_F00D_0000_0001);
    }

    #[test]
    fn out_of_bounds_load_leaves_register_but_keeps_writeback() {
        let mut state = CoreState::new();
        let last = MEMORY_SIZE as u64 - 4;
        state.arch.write(reg(1), true, last);
        state.arch.write(reg(0), true, 0xAB);
        let result = execute_ldr(
            &mut state,
            AddressingMode::PostIndexed,
            &transfer(true, true, TransferOffset::PostIndexed { simm9: 8 }),
        );
        assert_eq!(result, Err(FaultCode::MemoryOutOfBounds));
        assert_eq!(state.arch.x(reg(0)), 0xAB);
        assert_eq!(state.arch.x(reg(1)), last + 8);
    }

    #[test]
    fn out_of_bounds_store_is_ignored() {
        let mut state = CoreState::new();
        state.arch.write(reg(1), true, MEMORY_SIZE as u64);
        state.arch.write(reg(0), true, 7);
        let result = execute_str(
            &mut state,
            &mut NullMmio,
            AddressingMode::ZeroOffset,
            &transfer(false, false, TransferOffset::Unsigned { imm12: 0 }),
        );
        assert_eq!(result, Err(FaultCode::MemoryOutOfBounds));
        assert_eq!(state.memory.non_zero_words().count(), 0);
    }

    #[test]
    fn gpio_stores_bypass_memory() {
        let mut state = CoreState::new();
        let mut bus = RecordingMmio::default();
        state.arch.write(reg(1), true, GPIO_START + 0x1C);
        state.arch.write(reg(0), true, 0x0000_0002_0000_0001);
        execute_str(
            &mut state,
            &mut bus,
            AddressingMode::ZeroOffset,
            &transfer(true, false, TransferOffset::Unsigned { imm12: 0 }),
        )
        .expect("peripheral accepts store");
        assert_eq!(
            bus.writes,
            vec![(GPIO_START + 0x1C, 1), (GPIO_START + 0x20, 2)]
        );
        assert_eq!(state.memory.non_zero_words().count(), 0);
    }

    #[test]
    fn store_straddling_gpio_end_writes_nothing() {
        let mut state = CoreState::new();
        let mut bus = RecordingMmio::default();
        state.arch.write(reg(1), true, GPIO_END - 3);
        state.arch.write(reg(0), true, u64::MAX);
        let result = execute_str(
            &mut state,
            &mut bus,
            AddressingMode::ZeroOffset,
            &transfer(true, false, TransferOffset::Unsigned { imm12: 0 }),
        );
        assert_eq!(result, Err(FaultCode::MemoryOutOfBounds));
        assert!(bus.writes.is_empty());

        state.arch.write(reg(1), true, GPIO_END - 1);
        let result = execute_str(
            &mut state,
            &mut bus,
            AddressingMode::ZeroOffset,
            &transfer(false, false, TransferOffset::Unsigned { imm12: 0 }),
        );
        assert_eq!(result, Err(FaultCode::MemoryOutOfBounds));
        assert!(bus.writes.is_empty());

        state.arch.write(reg(1), true, GPIO_END - 3);
        execute_str(
            &mut state,
            &mut bus,
            AddressingMode::ZeroOffset,
            &transfer(false, false, TransferOffset::Unsigned { imm12: 0 }),
        )
        .expect("last word of the window accepts a narrow store");
        assert_eq!(bus.writes, vec![(GPIO_END - 3, u32::MAX)]);
    }

    #[test]
    fn gpio_failure_is_reported() {
        let mut state = CoreState::new();
        let mut bus = RecordingMmio {
            fail: true,
            ..RecordingMmio::default()
        };
        state.arch.write(reg(1), true, GPIO_START);
        let result = execute_str(
            &mut state,
            &mut bus,
            AddressingMode::ZeroOffset,
            &transfer(false, false, TransferOffset::Unsigned { imm12: 0 }),
        );
        assert_eq!(result, Err(FaultCode::MmioWriteFailed));
    }

    #[test]
    fn direction_mismatch_is_rejected() {
        let mut state = CoreState::new();
        let zero = TransferOffset::Unsigned { imm12: 0 };
        assert_eq!(
            execute_ldr(
                &mut state,
                AddressingMode::ZeroOffset,
                &transfer(true, false, zero)
            ),
            Err(FaultCode::AddressingModeMismatch)
        );
        assert_eq!(
            execute_str(
                &mut state,
                &mut NullMmio,
                AddressingMode::ZeroOffset,
                &transfer(true, true, zero)
            ),
            Err(FaultCode::AddressingModeMismatch)
        );
    }
}
