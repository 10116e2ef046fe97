use bitmaps::{Bitmap, Bits, BitsImpl};

use crate::memory::{
    MemoryError,
    config::ManagerConfig,
    macros::{impl_typed_access, impl_typed_accesses},
    registry::{Entry, Registry},
    store::{FlashDevice, NvStore, StoreConfig},
    types::{Direction, MAX_VALUE_SIZE, ValueKind, WriteOutcome},
};

/// Key-value memory manager over a flash-backed store.
///
/// Owns the registry, the flash device handle and the store. All access goes
/// through the key-based API; ids and raw offsets are never exposed for
/// mutation.
///
/// # Type Parameters
/// - `D`: Flash device providing readiness and page geometry
/// - `S`: Log-structured store addressed by entry id
/// - `N`: Number of registry entries
///
/// Access is not internally synchronized. Wrap it in a
/// [`SharedMemoryManager`](crate::memory::SharedMemoryManager) when more than
/// one context needs it.
pub struct MemoryManager<D, S, const N: usize>
where
    D: FlashDevice,
    S: NvStore,
    BitsImpl<N>: Bits,
{
    device: D,
    store: S,
    config: ManagerConfig,
    registry: Registry<N>,
    initialized: bool,
    restored: Bitmap<N>,
    unsynced: Bitmap<N>,
}

impl<D, S, const N: usize> core::fmt::Debug for MemoryManager<D, S, N>
where
    D: FlashDevice,
    S: NvStore,
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryManager")
            .field("config", &self.config)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl<D, S, const N: usize> MemoryManager<D, S, N>
where
    D: FlashDevice,
    S: NvStore,
    BitsImpl<N>: Bits,
{
    /// Creates an uninitialized manager. Call [`Self::init`] before use.
    pub fn new(device: D, store: S, registry: Registry<N>, config: ManagerConfig) -> Self {
        Self {
            device,
            store,
            config,
            registry,
            initialized: false,
            restored: Bitmap::new(),
            unsynced: Bitmap::new(),
        }
    }

    /// Mounts the store and populates every entry from flash or its default.
    ///
    /// Idempotent: once initialized, returns `Ok(())` without touching the
    /// device or the store.
    ///
    /// Entries the store has no value for (first boot), or whose read fails,
    /// are reset to their default and the default is written back so the
    /// store holds a value for every id. A failed default write does not
    /// fail initialization; the entry is reported by [`Self::is_synced`]
    /// until a later write succeeds.
    ///
    /// # Errors
    /// - [`MemoryError::DeviceNotReady`] if the flash device is not ready
    /// - [`MemoryError::GeometryUnavailable`] if no page info exists at the partition offset
    /// - [`MemoryError::MountFailed`] if the store fails to mount
    pub fn init(&mut self) -> Result<(), MemoryError> {
        if self.initialized {
            return Ok(());
        }

        if !self.device.is_ready() {
            warn!("flash device not ready");
            return Err(MemoryError::DeviceNotReady);
        }

        let offset = self.config.partition_offset;
        let page = self.device.page_info(offset).ok_or_else(|| {
            warn!("can't get flash page info at offset {}", offset);
            MemoryError::GeometryUnavailable
        })?;

        let store_config = StoreConfig {
            offset,
            sector_size: page.size,
            sector_count: self.config.sector_count,
        };
        self.store.mount(store_config).map_err(|_| {
            warn!("flash store mount failed");
            MemoryError::MountFailed
        })?;

        for (index, entry) in self.registry.iter_mut().enumerate() {
            let size = entry.size();
            let mut buf = [0u8; MAX_VALUE_SIZE];

            match self.store.read(entry.id(), &mut buf[..size]) {
                Ok(read) if read == size => {
                    entry.value_mut().copy_from_slice(&buf[..size]);
                    self.restored.set(index, true);
                    debug!("restored {} (id {})", entry.key(), entry.id());
                }
                _ => {
                    entry.reset_to_default();
                    let written = self
                        .store
                        .write(entry.id(), entry.value())
                        .map_err(|_| MemoryError::WriteError)
                        .and_then(|written| WriteOutcome::classify(written, size));
                    self.unsynced.set(index, written.is_err());

                    match written {
                        Ok(_) => info!("wrote default for {} (id {})", entry.key(), entry.id()),
                        Err(_) => {
                            warn!(
                                "failed to write default for {} (id {})",
                                entry.key(),
                                entry.id()
                            )
                        }
                    }
                }
            }
        }

        self.initialized = true;
        Ok(())
    }

    /// Copies the cached value for `key` into `out`.
    ///
    /// Serves the in-memory cache only; the store is not read. The result
    /// reflects the latest Save even if that Save's store write failed.
    ///
    /// # Errors
    /// - [`MemoryError::NotInitialized`] before a successful [`Self::init`]
    /// - [`MemoryError::InvalidKey`] if `key` is not registered
    /// - [`MemoryError::SizeMismatch`] if `out.len()` differs from the entry's size
    pub fn load(&self, key: &str, out: &mut [u8]) -> Result<(), MemoryError> {
        let index = self.lookup(key)?;
        self.load_at(index, out)
    }

    /// Updates the cached value for `key` and writes it to the store.
    ///
    /// The cache is updated before the store write is attempted, so on
    /// [`MemoryError::WriteError`] the cache is ahead of flash. Check the
    /// result before relying on the value surviving power loss.
    ///
    /// # Errors
    /// - [`MemoryError::NotInitialized`] before a successful [`Self::init`]
    /// - [`MemoryError::InvalidKey`] if `key` is not registered
    /// - [`MemoryError::SizeMismatch`] if `data.len()` differs from the entry's size
    /// - [`MemoryError::WriteError`] if the store wrote neither 0 nor `data.len()` bytes
    pub fn save(&mut self, key: &str, data: &[u8]) -> Result<WriteOutcome, MemoryError> {
        let index = self.lookup(key)?;
        self.save_at(index, data)
    }

    /// Dispatches to [`Self::load`] or [`Self::save`].
    pub fn access(
        &mut self,
        direction: Direction,
        key: &str,
        buf: &mut [u8],
    ) -> Result<(), MemoryError> {
        match direction {
            Direction::Load => self.load(key, buf),
            Direction::Save => self.save(key, buf).map(|_| ()),
        }
    }

    /// Like [`Self::access`], with the direction given as a raw flag
    /// ([`Direction::RAW_LOAD`] or [`Direction::RAW_SAVE`]).
    ///
    /// # Errors
    /// [`MemoryError::InvalidDirection`] for any other flag value.
    pub fn access_raw(&mut self, method: u8, key: &str, buf: &mut [u8]) -> Result<(), MemoryError> {
        let direction = Direction::try_from(method).inspect_err(|_| {
            warn!("invalid access direction {}", method);
        })?;
        self.access(direction, key, buf)
    }

    /// Returns the registry index for `key`.
    #[inline]
    pub fn resolve(&self, key: &str) -> Option<usize> {
        self.registry.resolve(key)
    }

    impl_typed_accesses!();

    /// Saves the compile-time default for `key` through the normal save path.
    pub fn restore_default(&mut self, key: &str) -> Result<WriteOutcome, MemoryError> {
        let index = self.lookup(key)?;
        let entry = self.entry_at(index)?;
        let size = entry.size();
        let mut buf = [0u8; MAX_VALUE_SIZE];
        buf[..size].copy_from_slice(entry.default_value());
        self.save_at(index, &buf[..size])
    }

    /// Rewrites every entry whose cached value is ahead of the store.
    ///
    /// Each unsynced entry is written once, in registry order. Returns how many
    /// entries became synced. Stops at the first write failure.
    pub fn sync(&mut self) -> Result<usize, MemoryError> {
        if !self.initialized {
            warn!("memory manager not initialized, unable to sync");
            return Err(MemoryError::NotInitialized);
        }

        let mut synced = 0;
        let mut next = self.unsynced.first_index();
        while let Some(index) = next {
            let entry = self.registry.get(index).ok_or(MemoryError::InvalidKey)?;
            let size = entry.size();
            let written = self
                .store
                .write(entry.id(), entry.value())
                .map_err(|_| MemoryError::WriteError)
                .and_then(|written| WriteOutcome::classify(written, size));

            if let Err(err) = written {
                warn!("sync of {} (id {}) failed", entry.key(), entry.id());
                return Err(err);
            }

            self.unsynced.set(index, false);
            synced += 1;
            next = self.unsynced.next_index(index);
        }

        Ok(synced)
    }

    /// Returns true if the store holds the cached value for `key`.
    pub fn is_synced(&self, key: &str) -> Result<bool, MemoryError> {
        let index = self.lookup(key)?;
        Ok(!self.unsynced.get(index))
    }

    /// Returns true if any cached value is ahead of the store.
    #[inline]
    pub fn any_unsynced(&self) -> bool {
        !self.unsynced.is_empty()
    }

    /// Returns true if `key` was recovered from the store during init rather
    /// than reset to its default.
    pub fn was_restored(&self, key: &str) -> Result<bool, MemoryError> {
        let index = self.lookup(key)?;
        Ok(self.restored.get(index))
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Read-only view of the registry.
    #[inline]
    pub fn registry(&self) -> &Registry<N> {
        &self.registry
    }

    /// Registered keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registry.iter().map(Entry::key)
    }

    /// Storage id bound to `key`.
    pub fn id_of(&self, key: &str) -> Option<u16> {
        self.registry.find(key).map(Entry::id)
    }

    /// Declared value kind of `key`.
    pub fn kind_of(&self, key: &str) -> Option<ValueKind> {
        self.registry.find(key).map(Entry::kind)
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the manager, returning the device and store.
    pub fn release(self) -> (D, S) {
        (self.device, self.store)
    }

    fn lookup(&self, key: &str) -> Result<usize, MemoryError> {
        if !self.initialized {
            warn!("memory manager not initialized, unable to access [{}]", key);
            return Err(MemoryError::NotInitialized);
        }

        self.registry.resolve(key).ok_or_else(|| {
            warn!("data member [{}] does not exist", key);
            MemoryError::InvalidKey
        })
    }

    fn entry_at(&self, index: usize) -> Result<&Entry, MemoryError> {
        self.registry.get(index).ok_or(MemoryError::InvalidKey)
    }

    fn load_at(&self, index: usize, out: &mut [u8]) -> Result<(), MemoryError> {
        let entry = self.entry_at(index)?;
        if out.len() != entry.size() {
            warn!(
                "load of [{}] with {} bytes, value is {} bytes",
                entry.key(),
                out.len(),
                entry.size()
            );
            return Err(MemoryError::SizeMismatch);
        }

        out.copy_from_slice(entry.value());
        Ok(())
    }

    fn save_at(&mut self, index: usize, data: &[u8]) -> Result<WriteOutcome, MemoryError> {
        let entry = self
            .registry
            .get_mut(index)
            .ok_or(MemoryError::InvalidKey)?;
        if data.len() != entry.size() {
            warn!(
                "save of [{}] with {} bytes, value is {} bytes",
                entry.key(),
                data.len(),
                entry.size()
            );
            return Err(MemoryError::SizeMismatch);
        }

        entry.value_mut().copy_from_slice(data);

        let result = self
            .store
            .write(entry.id(), data)
            .map_err(|_| MemoryError::WriteError)
            .and_then(|written| WriteOutcome::classify(written, data.len()));
        self.unsynced.set(index, result.is_err());

        if result.is_err() {
            warn!("write of [{}] (id {}) failed", entry.key(), entry.id());
        }

        result
    }

    fn load_kind(&self, key: &str, kind: ValueKind, out: &mut [u8]) -> Result<(), MemoryError> {
        let index = self.lookup(key)?;
        self.check_kind(index, kind)?;
        self.load_at(index, out)
    }

    fn save_kind(
        &mut self,
        key: &str,
        kind: ValueKind,
        data: &[u8],
    ) -> Result<WriteOutcome, MemoryError> {
        let index = self.lookup(key)?;
        self.check_kind(index, kind)?;
        self.save_at(index, data)
    }

    fn check_kind(&self, index: usize, kind: ValueKind) -> Result<(), MemoryError> {
        let entry = self.entry_at(index)?;
        if entry.kind() != kind {
            warn!("[{}] accessed as the wrong value type", entry.key());
            return Err(MemoryError::TypeMismatch);
        }
        Ok(())
    }
}
