//! [`NvStore`] over a NOR flash partition using `sequential-storage`.
//!
//! The map is keyed by entry id. Async flash calls are driven to completion
//! with [`embassy_futures::block_on`], so this store suits flash drivers
//! that complete without an executor (blocking drivers behind the async
//! traits, or a RAM-backed flash in tests).

use core::ops::Range;

use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::{cache::NoCache, map};

use crate::memory::{
    store::{NvStore, StoreConfig},
    types::MAX_VALUE_SIZE,
};

/// Scratch buffer size for map items (key, length header and value).
const ITEM_BUFFER_SIZE: usize = 64;

/// Failure reported by [`SequentialStore`].
#[derive(Debug)]
pub enum SequentialError<E> {
    /// Read or write before a successful mount
    NotMounted,
    /// Partition is not sector aligned or does not fit the flash
    Geometry,
    /// Value is larger than any registry entry can be
    TooLarge,
    /// Error from the underlying map
    Storage(sequential_storage::Error<E>),
}

impl<E> From<sequential_storage::Error<E>> for SequentialError<E> {
    fn from(err: sequential_storage::Error<E>) -> Self {
        SequentialError::Storage(err)
    }
}

/// Wear-leveled store on a NOR flash partition.
pub struct SequentialStore<F: NorFlash> {
    flash: F,
    range: Option<Range<u32>>,
    buffer: [u8; ITEM_BUFFER_SIZE],
}

impl<F: NorFlash> SequentialStore<F> {
    pub fn new(flash: F) -> Self {
        Self {
            flash,
            range: None,
            buffer: [0; ITEM_BUFFER_SIZE],
        }
    }

    /// Flash range in use, once mounted.
    pub fn range(&self) -> Option<Range<u32>> {
        self.range.clone()
    }

    pub fn flash(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn mounted_range(&self) -> Result<Range<u32>, SequentialError<F::Error>> {
        self.range.clone().ok_or(SequentialError::NotMounted)
    }
}

impl<F: NorFlash> NvStore for SequentialStore<F> {
    type Error = SequentialError<F::Error>;

    fn mount(&mut self, config: StoreConfig) -> Result<(), Self::Error> {
        let erase = F::ERASE_SIZE as u32;
        let size = config.partition_size();
        let end = config.offset.checked_add(size).ok_or(SequentialError::Geometry)?;

        let aligned = erase != 0
            && config.offset % erase == 0
            && config.sector_size % erase == 0
            && size > 0;
        if config.sector_count < 2 || !aligned || end as usize > self.flash.capacity() {
            return Err(SequentialError::Geometry);
        }

        self.range = Some(config.offset..end);
        Ok(())
    }

    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let range = self.mounted_range()?;
        let item = embassy_futures::block_on(map::fetch_item::<u16, &[u8], _>(
            &mut self.flash,
            range,
            &mut NoCache::new(),
            &mut self.buffer,
            &id,
        ))?;

        match item {
            Some(data) => {
                let len = data.len();
                let copied = len.min(buf.len());
                buf[..copied].copy_from_slice(&data[..copied]);
                Ok(len)
            }
            None => Ok(0),
        }
    }

    fn write(&mut self, id: u16, data: &[u8]) -> Result<usize, Self::Error> {
        if data.len() > MAX_VALUE_SIZE {
            return Err(SequentialError::TooLarge);
        }

        let mut current = [0u8; MAX_VALUE_SIZE];
        let stored = self.read(id, &mut current)?;
        if stored == data.len() && current[..stored] == *data {
            return Ok(0);
        }

        let range = self.mounted_range()?;
        embassy_futures::block_on(map::store_item(
            &mut self.flash,
            range,
            &mut NoCache::new(),
            &mut self.buffer,
            &id,
            &data,
        ))?;
        Ok(data.len())
    }
}
