//! GPIO controller register window.
//!
//! Models the function-select, set and clear registers of a BCM283x-style
//! GPIO block. Only stores reach the peripheral; loads from the window read
//! ordinary memory.

use crate::api::{MmioBus, MmioError, MmioWriteResult};
use crate::memory::{GPIO_END, GPIO_START};

/// Number of pins served by the controller.
pub const GPIO_PIN_COUNT: u8 = 54;

/// Offset of `GPFSEL0` from the window base.
pub const GPFSEL0_OFFSET: u64 = 0x00;
/// Offset of `GPFSEL5` from the window base.
pub const GPFSEL5_OFFSET: u64 = 0x14;
/// Offset of `GPSET0` from the window base.
pub const GPSET0_OFFSET: u64 = 0x1C;
/// Offset of `GPSET1` from the window base.
pub const GPSET1_OFFSET: u64 = 0x20;
/// Offset of `GPCLR0` from the window base.
pub const GPCLR0_OFFSET: u64 = 0x28;
/// Offset of `GPCLR1` from the window base.
pub const GPCLR1_OFFSET: u64 = 0x2C;

/// A pin level change caused by a SET or CLR write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PinEvent {
    /// Pin number.
    pub pin: u8,
    /// `true` for SET, `false` for CLR.
    pub on: bool,
}

/// GPIO peripheral state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpioPeripheral {
    function_select: [u32; 6],
    levels: u64,
    events: Vec<PinEvent>,
}

impl GpioPeripheral {
    /// Creates a controller with every pin low.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to `GPFSELn`.
    #[must_use]
    pub fn function_select(&self, index: usize) -> Option<u32> {
        self.function_select.get(index).copied()
    }

    /// Current output level of `pin`.
    #[must_use]
    pub const fn level(&self, pin: u8) -> bool {
        pin < GPIO_PIN_COUNT && self.levels & (1 << pin) != 0
    }

    /// Pin changes in write order.
    #[must_use]
    pub fn events(&self) -> &[PinEvent] {
        &self.events
    }

    /// Drains the recorded pin changes.
    pub fn take_events(&mut self) -> Vec<PinEvent> {
        std::mem::take(&mut self.events)
    }

    fn drive(&mut self, first_pin: u8, mask: u32, on: bool) {
        for bit in 0..32u8 {
            let pin = first_pin + bit;
            if mask & (1 << bit) == 0 || pin >= GPIO_PIN_COUNT {
                continue;
            }
            if on {
                self.levels |= 1 << pin;
                tracing::info!(pin, "PIN ON");
            } else {
                self.levels &= !(1 << pin);
                tracing::info!(pin, "PIN OFF");
            }
            self.events.push(PinEvent { pin, on });
        }
    }
}

impl MmioBus for GpioPeripheral {
    #[allow(clippy::cast_possible_truncation)]
    fn write32(&mut self, addr: u64, value: u32) -> Result<MmioWriteResult, MmioError> {
        if !(GPIO_START..=GPIO_END).contains(&addr) {
            return Err(MmioError::Unmapped { addr });
        }
        match addr - GPIO_START {
            offset @ GPFSEL0_OFFSET..=GPFSEL5_OFFSET if offset % 4 == 0 => {
                self.function_select[(offset / 4) as usize] = value;
            }
            GPSET0_OFFSET => self.drive(0, value, true),
            GPSET1_OFFSET => self.drive(32, value, true),
            GPCLR0_OFFSET => self.drive(0, value, false),
            GPCLR1_OFFSET => self.drive(32, value, false),
            offset => {
                tracing::debug!(offset, value, "write to unmodeled GPIO register");
                return Ok(MmioWriteResult::Ignored);
            }
        }
        Ok(MmioWriteResult::Applied)
    }
}
