/// Errors that can occur during memory manager operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryError {
    /// Reserved. `init` is idempotent and never returns this.
    AlreadyInitialized,
    /// The flash device backing the partition is not ready for I/O.
    DeviceNotReady,
    /// Page geometry for the partition offset could not be obtained.
    GeometryUnavailable,
    /// The store failed to mount.
    MountFailed,
    /// Operation attempted before a successful `init`.
    NotInitialized,
    /// Key is not present in the registry.
    InvalidKey,
    /// Store write reported neither 0 bytes nor the requested length.
    WriteError,
    /// Malformed direction flag passed to unified access.
    InvalidDirection,
    /// Buffer length differs from the entry's declared value size.
    SizeMismatch,
    /// Typed access does not match the entry's declared value kind.
    TypeMismatch,
    /// Two registry entries share a key.
    DuplicateKey,
    /// Two registry entries share a storage id.
    DuplicateId,
    /// The shared manager is already borrowed by the current context.
    Busy,
}

impl core::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MemoryError::AlreadyInitialized => write!(f, "memory manager already initialized"),
            MemoryError::DeviceNotReady => write!(f, "flash device not ready"),
            MemoryError::GeometryUnavailable => write!(f, "flash page geometry unavailable"),
            MemoryError::MountFailed => write!(f, "flash store mount failed"),
            MemoryError::NotInitialized => write!(f, "memory manager not initialized"),
            MemoryError::InvalidKey => write!(f, "key does not exist"),
            MemoryError::WriteError => write!(f, "flash store write failed"),
            MemoryError::InvalidDirection => write!(f, "invalid access direction"),
            MemoryError::SizeMismatch => write!(f, "buffer size does not match value size"),
            MemoryError::TypeMismatch => write!(f, "value type does not match entry type"),
            MemoryError::DuplicateKey => write!(f, "duplicate key in registry"),
            MemoryError::DuplicateId => write!(f, "duplicate storage id in registry"),
            MemoryError::Busy => write!(f, "memory manager busy"),
        }
    }
}
