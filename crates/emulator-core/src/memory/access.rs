//! Fetch and data-access legality checks.

use super::MEMORY_SIZE;
use crate::encoding::INSTRUCTION_BYTES;
use crate::FaultCode;

/// Validates that `pc` can fetch a full instruction word.
///
/// # Errors
///
/// Returns [`FaultCode::PcOutOfBounds`] when the word would extend past the
/// end of memory and [`FaultCode::MisalignedPc`] when `pc` is not a multiple
/// of four.
#[allow(clippy::cast_possible_truncation)]
pub const fn validate_fetch_access(pc: u64) -> Result<usize, FaultCode> {
    if pc > MEMORY_SIZE as u64 - INSTRUCTION_BYTES {
        return Err(FaultCode::PcOutOfBounds);
    }
    if pc % INSTRUCTION_BYTES != 0 {
        return Err(FaultCode::MisalignedPc);
    }
    Ok(pc as usize)
}

/// Validates a `width`-byte data access and returns the starting byte index.
///
/// Data accesses need no alignment; only the byte range is checked.
///
/// # Errors
///
/// Returns [`FaultCode::MemoryOutOfBounds`] when any addressed byte lies
/// outside memory.
#[allow(clippy::cast_possible_truncation)]
pub const fn validate_data_access(addr: u64, width: usize) -> Result<usize, FaultCode> {
    match addr.checked_add(width as u64) {
        Some(end) if end <= MEMORY_SIZE as u64 => Ok(addr as usize),
        _ => Err(FaultCode::MemoryOutOfBounds),
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_data_access, validate_fetch_access};
    use crate::memory::MEMORY_SIZE;
    use crate::FaultCode;

    const LAST_WORD: u64 = MEMORY_SIZE as u64 - 4;

    #[test]
    fn fetch_legality_covers_bounds_and_alignment() {
        assert_eq!(validate_fetch_access(0), Ok(0));
        assert_eq!(validate_fetch_access(LAST_WORD), Ok(MEMORY_SIZE - 4));
        assert_eq!(
            validate_fetch_access(LAST_WORD + 4),
            Err(FaultCode::PcOutOfBounds)
        );
        assert_eq!(validate_fetch_access(u64::MAX), Err(FaultCode::PcOutOfBounds));
        assert_eq!(validate_fetch_access(6), Err(FaultCode::MisalignedPc));
    }

    #[test]
    fn data_access_checks_every_byte() {
        assert_eq!(validate_data_access(LAST_WORD, 4), Ok(MEMORY_SIZE - 4));
        assert_eq!(
            validate_data_access(LAST_WORD, 8),
            Err(FaultCode::MemoryOutOfBounds)
        );
        assert_eq!(validate_data_access(3, 8), Ok(3));
        assert_eq!(
            validate_data_access(u64::MAX - 2, 4),
            Err(FaultCode::MemoryOutOfBounds)
        );
    }
}
