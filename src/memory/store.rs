//! Contracts consumed by the memory manager.
//!
//! The flash-backed store and the flash device are external collaborators.
//! The manager only relies on the narrow surface below; wear leveling,
//! compaction and write atomicity are the store's business.

/// Page (erase sector) layout at a given flash offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageInfo {
    /// Byte offset of the start of the page.
    pub start_offset: u32,
    /// Page size in bytes.
    pub size: u32,
    /// Page index within the device.
    pub index: u32,
}

/// Flash device readiness and geometry.
pub trait FlashDevice {
    /// Returns true if the device is ready for I/O.
    fn is_ready(&self) -> bool;
    /// Returns the page containing `offset`, or `None` if it cannot be determined.
    fn page_info(&self, offset: u32) -> Option<PageInfo>;
}

/// Mount parameters handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreConfig {
    /// Byte offset of the partition on the device.
    pub offset: u32,
    /// Sector size in bytes.
    pub sector_size: u32,
    /// Number of sectors the store rotates across.
    pub sector_count: u16,
}

impl StoreConfig {
    /// Total partition size in bytes.
    #[inline]
    pub fn partition_size(&self) -> u32 {
        self.sector_size.saturating_mul(self.sector_count as u32)
    }
}

/// Log-structured key-value store addressed by small integer ids.
///
/// The most recently completed write for an id must be recoverable after
/// power loss.
pub trait NvStore {
    type Error: core::fmt::Debug;

    /// One-time setup of the store over the configured partition.
    fn mount(&mut self, config: StoreConfig) -> Result<(), Self::Error>;

    /// Reads the latest value for `id` into `buf`.
    ///
    /// Returns the number of bytes stored for `id` (which may exceed
    /// `buf.len()`; only `buf.len()` bytes are copied), or `Ok(0)` if `id` has
    /// never been written.
    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Appends a new value for `id`.
    ///
    /// Returns `Ok(0)` if the stored value already equals `data` and nothing
    /// was written, otherwise the number of bytes written.
    fn write(&mut self, id: u16, data: &[u8]) -> Result<usize, Self::Error>;
}

/// A flash device that is always ready and has uniform pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedGeometry {
    page_size: u32,
    capacity: u32,
}

impl FixedGeometry {
    /// Creates a device with `capacity` bytes split into `page_size` pages.
    pub const fn new(page_size: u32, capacity: u32) -> Self {
        Self {
            page_size,
            capacity,
        }
    }
}

impl FlashDevice for FixedGeometry {
    fn is_ready(&self) -> bool {
        true
    }

    fn page_info(&self, offset: u32) -> Option<PageInfo> {
        if self.page_size == 0 || offset >= self.capacity {
            return None;
        }
        let index = offset / self.page_size;
        Some(PageInfo {
            start_offset: index * self.page_size,
            size: self.page_size,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_geometry_page_lookup() {
        let device = FixedGeometry::new(4096, 64 * 1024);
        assert!(device.is_ready());

        assert_eq!(
            device.page_info(0x1010),
            Some(PageInfo {
                start_offset: 0x1000,
                size: 4096,
                index: 1,
            })
        );
        assert_eq!(device.page_info(64 * 1024), None);
        assert_eq!(FixedGeometry::new(0, 4096).page_info(0), None);
    }

    #[test]
    fn partition_size_is_sector_size_times_count() {
        let config = StoreConfig {
            offset: 0,
            sector_size: 4096,
            sector_count: 2,
        };
        assert_eq!(config.partition_size(), 8192);
    }
}
