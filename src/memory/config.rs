/// Sector count used when none is configured: one active sector plus one
/// rotation sector for the store's compaction.
pub const DEFAULT_SECTOR_COUNT: u16 = 2;

/// Partition settings applied when the manager mounts the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ManagerConfig {
    /// Byte offset of the storage partition on the flash device.
    pub partition_offset: u32,
    /// Number of sectors the store rotates across.
    pub sector_count: u16,
}

impl ManagerConfig {
    pub const fn new(partition_offset: u32) -> Self {
        Self {
            partition_offset,
            sector_count: DEFAULT_SECTOR_COUNT,
        }
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
