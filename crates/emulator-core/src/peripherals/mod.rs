//! Memory-mapped peripherals reachable through [`crate::MmioBus`].

pub mod gpio;

pub use gpio::{GpioPeripheral, PinEvent, GPIO_PIN_COUNT};
