use core::marker::PhantomData;

use bitmaps::{Bits, BitsImpl};

use crate::memory::{
    config::ManagerConfig,
    manager::MemoryManager,
    registry::Registry,
    store::{FlashDevice, NvStore},
};

// Builder states
pub struct NeedDevice;
pub struct NeedStore;
pub struct NeedRegistry;
pub struct Ready;

/// Step-by-step construction of a [`MemoryManager`].
///
/// Device, store and registry are required, in that order; partition
/// offset and sector count are optional and default to
/// [`ManagerConfig::default`].
pub struct MemoryManagerBuilder<D, S, R, State> {
    device: D,
    store: S,
    registry: R,
    config: ManagerConfig,
    _phantom: PhantomData<State>,
}

// Start the builder
impl MemoryManagerBuilder<(), (), (), NeedDevice> {
    pub fn new() -> Self {
        MemoryManagerBuilder {
            device: (),
            store: (),
            registry: (),
            config: ManagerConfig::default(),
            _phantom: PhantomData,
        }
    }

    /// Set the flash device backing the storage partition
    pub fn device<D: FlashDevice>(self, device: D) -> MemoryManagerBuilder<D, (), (), NeedStore> {
        MemoryManagerBuilder {
            device,
            store: (),
            registry: (),
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

impl Default for MemoryManagerBuilder<(), (), (), NeedDevice> {
    fn default() -> Self {
        Self::new()
    }
}

// Set store
impl<D: FlashDevice> MemoryManagerBuilder<D, (), (), NeedStore> {
    /// Set the log-structured store mounted on the partition
    pub fn store<S: NvStore>(self, store: S) -> MemoryManagerBuilder<D, S, (), NeedRegistry> {
        MemoryManagerBuilder {
            device: self.device,
            store,
            registry: (),
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

// Set registry
impl<D: FlashDevice, S: NvStore> MemoryManagerBuilder<D, S, (), NeedRegistry> {
    /// Set the statically declared registry entries
    pub fn registry<const N: usize>(
        self,
        registry: Registry<N>,
    ) -> MemoryManagerBuilder<D, S, Registry<N>, Ready> {
        MemoryManagerBuilder {
            device: self.device,
            store: self.store,
            registry,
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

// Optional settings and build
impl<D, S, const N: usize> MemoryManagerBuilder<D, S, Registry<N>, Ready>
where
    D: FlashDevice,
    S: NvStore,
    BitsImpl<N>: Bits,
{
    /// Byte offset of the storage partition on the device
    pub fn partition_offset(mut self, offset: u32) -> Self {
        self.config.partition_offset = offset;
        self
    }

    /// Number of sectors the store rotates across
    pub fn sector_count(mut self, count: u16) -> Self {
        self.config.sector_count = count;
        self
    }

    /// Replace all optional settings at once
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build an uninitialized manager. Call
    /// [`MemoryManager::init`] before loading or saving.
    pub fn build(self) -> MemoryManager<D, S, N> {
        MemoryManager::new(self.device, self.store, self.registry, self.config)
    }
}
