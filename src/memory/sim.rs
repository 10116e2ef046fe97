//! In-RAM flash simulation for host tests and demos.
//!
//! [`SimStore`] behaves like a small log-structured store: every write
//! appends a record to the active sector, reads return the newest record for
//! an id, and a full sector is compacted into the spare one. Writes whose
//! content matches the newest record are skipped and report 0 bytes.
//!
//! Both types support fault injection so the manager's error paths can be
//! exercised without hardware.

use heapless::Vec;

use crate::memory::store::{FlashDevice, NvStore, PageInfo, StoreConfig};

/// Largest value a [`SimStore`] record can hold.
pub const MAX_RECORD_LEN: usize = 32;

/// Maximum number of ids whose reads can be forced to fail.
pub const MAX_FAILING_READS: usize = 8;

/// Simulated flash device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimDevice {
    ready: bool,
    page_size: Option<u32>,
}

impl SimDevice {
    /// A ready device with uniform `page_size` pages.
    pub const fn new(page_size: u32) -> Self {
        Self {
            ready: true,
            page_size: Some(page_size),
        }
    }

    /// Reports the device as not ready.
    pub const fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Makes page geometry queries fail.
    pub const fn without_geometry(mut self) -> Self {
        self.page_size = None;
        self
    }
}

impl FlashDevice for SimDevice {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn page_info(&self, offset: u32) -> Option<PageInfo> {
        let size = self.page_size.filter(|size| *size > 0)?;
        let index = offset / size;
        Some(PageInfo {
            start_offset: index * size,
            size,
            index,
        })
    }
}

/// Errors reported by [`SimStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimError {
    /// Read or write before a successful mount.
    NotMounted,
    /// Fewer than two sectors, or a zero sector size.
    Geometry,
    /// Mount failure was injected.
    Mount,
    /// Read failure was injected for this id.
    Read,
    /// Write failure was injected.
    Write,
    /// Value longer than [`MAX_RECORD_LEN`].
    TooLarge,
    /// Both sectors are full of live records.
    Full,
    /// Fault-injection table is full.
    TooManyFaults,
}

/// Injected write behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFault {
    /// Writes fail with [`SimError::Write`].
    Error,
    /// Writes report this many bytes and persist nothing (torn write).
    Short(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Record {
    id: u16,
    len: u8,
    data: [u8; MAX_RECORD_LEN],
}

impl Record {
    fn new(id: u16, data: &[u8]) -> Self {
        let mut buf = [0u8; MAX_RECORD_LEN];
        buf[..data.len()].copy_from_slice(data);
        Self {
            id,
            len: data.len() as u8,
            data: buf,
        }
    }

    fn bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// In-RAM log-structured store with two sectors of `SLOTS` records each.
#[derive(Debug, Clone)]
pub struct SimStore<const SLOTS: usize> {
    sectors: [Vec<Record, SLOTS>; 2],
    active: usize,
    mounted: Option<StoreConfig>,
    fail_mount: bool,
    failing_reads: Vec<u16, MAX_FAILING_READS>,
    write_fault: Option<WriteFault>,
    reads: usize,
    writes: usize,
    erases: usize,
}

impl<const SLOTS: usize> SimStore<SLOTS> {
    /// An erased, unmounted store.
    pub const fn new() -> Self {
        Self {
            sectors: [Vec::new(), Vec::new()],
            active: 0,
            mounted: None,
            fail_mount: false,
            failing_reads: Vec::new(),
            write_fault: None,
            reads: 0,
            writes: 0,
            erases: 0,
        }
    }

    /// Appends a record without mounting or touching the counters.
    ///
    /// Use this to lay down pre-existing flash content before a test boots.
    pub fn preload(&mut self, id: u16, data: &[u8]) -> Result<(), SimError> {
        self.append(id, data)
    }

    /// Newest value stored for `id`.
    pub fn peek(&self, id: u16) -> Option<&[u8]> {
        self.latest(id).map(Record::bytes)
    }

    /// Forgets the mount, keeping flash content. Models a reboot.
    pub fn power_cycle(&mut self) {
        self.mounted = None;
        self.reads = 0;
        self.writes = 0;
    }

    /// Makes the next mount attempts fail (or succeed again).
    pub fn fail_mount(&mut self, fail: bool) {
        self.fail_mount = fail;
    }

    /// Makes every read of `id` fail.
    pub fn fail_reads_for(&mut self, id: u16) -> Result<(), SimError> {
        if self.failing_reads.contains(&id) {
            return Ok(());
        }
        self.failing_reads
            .push(id)
            .map_err(|_| SimError::TooManyFaults)
    }

    /// Clears all injected read failures.
    pub fn clear_read_faults(&mut self) {
        self.failing_reads.clear();
    }

    /// Injects (or clears, with `None`) a fault applied to every write.
    pub fn set_write_fault(&mut self, fault: Option<WriteFault>) {
        self.write_fault = fault;
    }

    /// Configuration of the current mount.
    pub fn mounted_config(&self) -> Option<StoreConfig> {
        self.mounted
    }

    /// Number of `read` calls since the last power cycle.
    pub fn read_count(&self) -> usize {
        self.reads
    }

    /// Number of `write` calls since the last power cycle.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Number of sector compactions over the store's lifetime.
    pub fn erase_count(&self) -> usize {
        self.erases
    }

    /// Number of records in the active sector.
    pub fn active_records(&self) -> usize {
        self.sectors[self.active].len()
    }

    fn latest(&self, id: u16) -> Option<&Record> {
        self.sectors[self.active]
            .iter()
            .rev()
            .find(|record| record.id == id)
    }

    fn append(&mut self, id: u16, data: &[u8]) -> Result<(), SimError> {
        if data.len() > MAX_RECORD_LEN {
            return Err(SimError::TooLarge);
        }

        let record = Record::new(id, data);
        if self.sectors[self.active].push(record).is_ok() {
            return Ok(());
        }

        self.compact();
        self.sectors[self.active]
            .push(record)
            .map_err(|_| SimError::Full)
    }

    /// Copies the newest record of each id into the spare sector and makes it
    /// active.
    fn compact(&mut self) {
        let spare = 1 - self.active;
        self.sectors[spare].clear();
        self.erases += 1;

        let (first, second) = self.sectors.split_at_mut(1);
        let (from, to) = if self.active == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };

        for (pos, record) in from.iter().enumerate() {
            let superseded = from[pos + 1..].iter().any(|later| later.id == record.id);
            if !superseded {
                // Spare has the same capacity as the source, so live records always fit
                let _ = to.push(*record);
            }
        }

        self.active = spare;
    }
}

impl<const SLOTS: usize> Default for SimStore<SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SLOTS: usize> NvStore for SimStore<SLOTS> {
    type Error = SimError;

    fn mount(&mut self, config: StoreConfig) -> Result<(), Self::Error> {
        if self.fail_mount {
            return Err(SimError::Mount);
        }
        if config.sector_count < 2 || config.sector_size == 0 {
            return Err(SimError::Geometry);
        }
        self.mounted = Some(config);
        Ok(())
    }

    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.mounted.is_none() {
            return Err(SimError::NotMounted);
        }
        self.reads += 1;

        if self.failing_reads.contains(&id) {
            return Err(SimError::Read);
        }

        match self.latest(id) {
            Some(record) => {
                let stored = record.bytes();
                let n = stored.len().min(buf.len());
                buf[..n].copy_from_slice(&stored[..n]);
                Ok(stored.len())
            }
            None => Ok(0),
        }
    }

    fn write(&mut self, id: u16, data: &[u8]) -> Result<usize, Self::Error> {
        if self.mounted.is_none() {
            return Err(SimError::NotMounted);
        }
        self.writes += 1;

        match self.write_fault {
            Some(WriteFault::Error) => return Err(SimError::Write),
            Some(WriteFault::Short(n)) => return Ok(n),
            None => {}
        }

        if self.peek(id) == Some(data) {
            return Ok(0);
        }

        self.append(id, data)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: StoreConfig = StoreConfig {
        offset: 0,
        sector_size: 4096,
        sector_count: 2,
    };

    fn mounted<const SLOTS: usize>() -> SimStore<SLOTS> {
        let mut store = SimStore::new();
        store.mount(CONFIG).unwrap();
        store
    }

    #[test]
    fn read_of_unwritten_id_returns_zero() {
        let mut store = mounted::<4>();
        let mut buf = [0u8; 4];
        assert_eq!(store.read(1, &mut buf), Ok(0));
    }

    #[test]
    fn write_then_read_latest() {
        let mut store = mounted::<8>();
        assert_eq!(store.write(1, &[1, 2, 3, 4]), Ok(4));
        assert_eq!(store.write(1, &[5, 6, 7, 8]), Ok(4));

        let mut buf = [0u8; 4];
        assert_eq!(store.read(1, &mut buf), Ok(4));
        assert_eq!(buf, [5, 6, 7, 8]);
    }

    #[test]
    fn unchanged_write_is_skipped() {
        let mut store = mounted::<8>();
        store.write(1, &[1, 2, 3, 4]).unwrap();
        assert_eq!(store.write(1, &[1, 2, 3, 4]), Ok(0));
        assert_eq!(store.active_records(), 1);
    }

    #[test]
    fn read_reports_stored_length_and_copies_prefix() {
        let mut store = mounted::<8>();
        store.write(3, &[9, 8, 7, 6]).unwrap();

        let mut buf = [0u8; 2];
        assert_eq!(store.read(3, &mut buf), Ok(4));
        assert_eq!(buf, [9, 8]);
    }

    #[test]
    fn unmounted_store_rejects_io() {
        let mut store = SimStore::<4>::new();
        let mut buf = [0u8; 4];
        assert_eq!(store.read(1, &mut buf), Err(SimError::NotMounted));
        assert_eq!(store.write(1, &buf), Err(SimError::NotMounted));
    }

    #[test]
    fn mount_validates_geometry() {
        let mut store = SimStore::<4>::new();
        let one_sector = StoreConfig {
            sector_count: 1,
            ..CONFIG
        };
        assert_eq!(store.mount(one_sector), Err(SimError::Geometry));
        assert_eq!(store.mounted_config(), None);

        store.fail_mount(true);
        assert_eq!(store.mount(CONFIG), Err(SimError::Mount));
    }

    #[test]
    fn compaction_keeps_latest_value_per_id() {
        let mut store = mounted::<4>();

        // Fill the active sector: id 1 three times, id 2 once
        store.write(1, &[1]).unwrap();
        store.write(1, &[2]).unwrap();
        store.write(2, &[20]).unwrap();
        store.write(1, &[3]).unwrap();
        assert_eq!(store.erase_count(), 0);

        // Next write triggers compaction into the spare sector
        store.write(2, &[21]).unwrap();
        assert_eq!(store.erase_count(), 1);
        assert_eq!(store.active_records(), 3);
        assert_eq!(store.peek(1), Some(&[3u8][..]));
        assert_eq!(store.peek(2), Some(&[21u8][..]));
    }

    #[test]
    fn full_store_reports_full() {
        let mut store = mounted::<2>();
        store.write(1, &[1]).unwrap();
        store.write(2, &[2]).unwrap();
        assert_eq!(store.write(3, &[3]), Err(SimError::Full));
    }

    #[test]
    fn oversized_value_is_rejected() {
        let mut store = mounted::<2>();
        assert_eq!(
            store.write(1, &[0u8; MAX_RECORD_LEN + 1]),
            Err(SimError::TooLarge)
        );
    }

    #[test]
    fn injected_faults() {
        let mut store = mounted::<4>();
        store.write(1, &[1, 1, 1, 1]).unwrap();

        store.fail_reads_for(1).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(store.read(1, &mut buf), Err(SimError::Read));
        store.clear_read_faults();
        assert_eq!(store.read(1, &mut buf), Ok(4));

        store.set_write_fault(Some(WriteFault::Short(2)));
        assert_eq!(store.write(1, &[2, 2, 2, 2]), Ok(2));
        assert_eq!(store.peek(1), Some(&[1u8, 1, 1, 1][..]));

        store.set_write_fault(Some(WriteFault::Error));
        assert_eq!(store.write(1, &[2, 2, 2, 2]), Err(SimError::Write));
    }

    #[test]
    fn power_cycle_keeps_content_and_requires_remount() {
        let mut store = mounted::<4>();
        store.write(7, &[7, 7]).unwrap();

        store.power_cycle();
        assert_eq!(store.read_count(), 0);
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.peek(7), Some(&[7u8, 7][..]));

        let mut buf = [0u8; 2];
        assert_eq!(store.read(7, &mut buf), Err(SimError::NotMounted));
        store.mount(CONFIG).unwrap();
        assert_eq!(store.read(7, &mut buf), Ok(2));
    }

    #[test]
    fn sim_device_geometry() {
        let device = SimDevice::new(2048);
        assert!(device.is_ready());
        assert_eq!(device.page_info(5000).map(|page| page.index), Some(2));
        assert!(!SimDevice::new(2048).not_ready().is_ready());
        assert_eq!(SimDevice::new(2048).without_geometry().page_info(0), None);
    }
}
