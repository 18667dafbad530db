//! Memory model primitives and address-space policies.

/// Fetch and data-access legality helpers.
pub mod access;
/// Fixed address map and region decoder.
pub mod map;

pub use access::{validate_data_access, validate_fetch_access};
pub use map::{decode_memory_region, MemoryRegion, GPIO_END, GPIO_START, RAM_END, RAM_START};

use crate::FaultCode;

/// Size in bytes of the backed memory region (2 MiB).
pub const MEMORY_SIZE: usize = 2 * 1024 * 1024;

/// Flat little-endian byte-addressable memory.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("size", &self.bytes.len())
            .field("non_zero_words", &self.non_zero_words().count())
            .finish()
    }
}

impl Memory {
    /// Allocates zeroed memory of [`MEMORY_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Copies `image` into the low end of memory.
    ///
    /// Returns the number of bytes that did not fit and were dropped.
    pub fn load_image(&mut self, image: &[u8]) -> usize {
        let kept = image.len().min(MEMORY_SIZE);
        self.bytes[..kept].copy_from_slice(&image[..kept]);
        let truncated = image.len() - kept;
        if truncated > 0 {
            tracing::warn!(
                image_len = image.len(),
                truncated,
                "image larger than memory; excess bytes dropped"
            );
        }
        truncated
    }

    /// Returns the raw backing bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads a little-endian 32-bit word.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryOutOfBounds`] when the word is not fully
    /// inside memory.
    pub fn read_u32(&self, addr: u64) -> Result<u32, FaultCode> {
        let start = validate_data_access(addr, 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[start..start + 4]);
        Ok(u32::from_le_bytes(raw))
    }

    /// Reads a little-endian 64-bit doubleword.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryOutOfBounds`] when the doubleword is not
    /// fully inside memory.
    pub fn read_u64(&self, addr: u64) -> Result<u64, FaultCode> {
        let start = validate_data_access(addr, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes[start..start + 8]);
        Ok(u64::from_le_bytes(raw))
    }

    /// Writes a little-endian 32-bit word.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryOutOfBounds`] when the word is not fully
    /// inside memory; memory is left untouched.
    pub fn write_u32(&mut self, addr: u64, value: u32) -> Result<(), FaultCode> {
        let start = validate_data_access(addr, 4)?;
        self.bytes[start..start + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes a little-endian 64-bit doubleword.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryOutOfBounds`] when the doubleword is not
    /// fully inside memory; memory is left untouched.
    pub fn write_u64(&mut self, addr: u64, value: u64) -> Result<(), FaultCode> {
        let start = validate_data_access(addr, 8)?;
        self.bytes[start..start + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Iterates `(address, word)` for every non-zero aligned 32-bit word.
    pub fn non_zero_words(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0u32..)
            .step_by(4)
            .zip(self.bytes.chunks_exact(4))
            .filter_map(|(addr, chunk)| {
                let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                (word != 0).then_some((addr, word))
            })
    }
}
