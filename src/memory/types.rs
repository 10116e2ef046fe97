use crate::memory::MemoryError;

/// Largest value size an entry may declare, in bytes.
pub const MAX_VALUE_SIZE: usize = 4;

/// Direction for [`MemoryManager::access`](crate::memory::MemoryManager::access).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Copy the cached value out to the caller.
    Load,
    /// Copy the caller's value in and persist it.
    Save,
}

impl Direction {
    /// Raw flag for [`Direction::Load`].
    pub const RAW_LOAD: u8 = 0;
    /// Raw flag for [`Direction::Save`].
    pub const RAW_SAVE: u8 = 1;
}

impl TryFrom<u8> for Direction {
    type Error = MemoryError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            Direction::RAW_LOAD => Ok(Direction::Load),
            Direction::RAW_SAVE => Ok(Direction::Save),
            _ => Err(MemoryError::InvalidDirection),
        }
    }
}

/// Outcome of a successful store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome {
    /// The store already held this value and skipped the write.
    Unchanged,
    /// The full value was written.
    Written,
}

impl WriteOutcome {
    /// Classifies the byte count reported by a store write of `len` bytes.
    ///
    /// Zero means the store skipped an unchanged value; exactly `len` means a
    /// complete write. Anything else is a [`MemoryError::WriteError`].
    #[inline]
    pub fn classify(written: usize, len: usize) -> Result<Self, MemoryError> {
        if written == 0 {
            Ok(WriteOutcome::Unchanged)
        } else if written == len {
            Ok(WriteOutcome::Written)
        } else {
            Err(MemoryError::WriteError)
        }
    }

    /// Returns true if the store actually wrote data.
    #[inline]
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// Declared type of a registry entry's value.
///
/// Values are stored as their little-endian byte encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
}

impl ValueKind {
    /// Exact encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            ValueKind::U8 | ValueKind::I8 => 1,
            ValueKind::U16 | ValueKind::I16 => 2,
            ValueKind::U32 | ValueKind::I32 | ValueKind::F32 => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_raw_flag() {
        assert_eq!(Direction::try_from(0), Ok(Direction::Load));
        assert_eq!(Direction::try_from(1), Ok(Direction::Save));
        assert_eq!(Direction::try_from(2), Err(MemoryError::InvalidDirection));
        assert_eq!(Direction::try_from(0xFF), Err(MemoryError::InvalidDirection));
    }

    #[test]
    fn write_classification() {
        assert_eq!(WriteOutcome::classify(0, 4), Ok(WriteOutcome::Unchanged));
        assert_eq!(WriteOutcome::classify(4, 4), Ok(WriteOutcome::Written));
        assert_eq!(WriteOutcome::classify(2, 4), Err(MemoryError::WriteError));
        assert_eq!(WriteOutcome::classify(8, 4), Err(MemoryError::WriteError));
    }

    #[test]
    fn value_kind_sizes_fit_max() {
        for kind in [
            ValueKind::U8,
            ValueKind::I8,
            ValueKind::U16,
            ValueKind::I16,
            ValueKind::U32,
            ValueKind::I32,
            ValueKind::F32,
        ] {
            assert!(kind.size() <= MAX_VALUE_SIZE);
        }
        assert_eq!(ValueKind::U32.size(), 4);
        assert_eq!(ValueKind::I16.size(), 2);
    }
}
