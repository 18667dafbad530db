//! Physical address map: backed RAM plus the memory-mapped GPIO window.

use super::MEMORY_SIZE;

/// Inclusive start address of backed RAM.
pub const RAM_START: u64 = 0x0000_0000;
/// Inclusive end address of backed RAM.
pub const RAM_END: u64 = MEMORY_SIZE as u64 - 1;
/// Inclusive start address of the GPIO register window.
pub const GPIO_START: u64 = 0x3F20_0000;
/// Inclusive end address of the GPIO register window.
pub const GPIO_END: u64 = 0x3F20_00B3;

/// Region classification for physical addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    /// Backed little-endian RAM (`0x0..=0x1F_FFFF`).
    Ram,
    /// GPIO peripheral registers (`0x3F20_0000..=0x3F20_00B3`).
    Gpio,
    /// Anything else; accesses fault.
    Unmapped,
}

impl MemoryRegion {
    /// Returns the inclusive bounds for mapped regions.
    #[must_use]
    pub const fn bounds(self) -> Option<(u64, u64)> {
        match self {
            Self::Ram => Some((RAM_START, RAM_END)),
            Self::Gpio => Some((GPIO_START, GPIO_END)),
            Self::Unmapped => None,
        }
    }

    /// Returns `true` when `addr` belongs to this region.
    #[must_use]
    pub const fn contains(self, addr: u64) -> bool {
        match self.bounds() {
            Some((start, end)) => addr >= start && addr <= end,
            None => matches!(decode_memory_region(addr), Self::Unmapped),
        }
    }
}

const _: () = assert!(RAM_END < GPIO_START, "ram must sit below the gpio window");

/// Decodes a physical address into its region.
#[must_use]
pub const fn decode_memory_region(addr: u64) -> MemoryRegion {
    match addr {
        RAM_START..=RAM_END => MemoryRegion::Ram,
        GPIO_START..=GPIO_END => MemoryRegion::Gpio,
        _ => MemoryRegion::Unmapped,
    }
}
