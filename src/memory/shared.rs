use core::cell::RefCell;

use bitmaps::{Bits, BitsImpl};
use critical_section::Mutex;

use crate::memory::{
    MemoryError,
    manager::MemoryManager,
    store::{FlashDevice, NvStore},
    types::WriteOutcome,
};

/// A [`MemoryManager`] behind a critical-section lock.
///
/// Serializes every call so the manager can be reached from several tasks or
/// interrupt handlers. Starts empty so it can live in a `static`; install the
/// manager from the composition root during boot.
///
/// ```rust,no_run
/// use embedded_memory_manager::prelude::*;
///
/// static MEMORY: SharedMemoryManager<SimDevice, SimStore<16>, 1> = SharedMemoryManager::new();
///
/// let manager = MemoryManagerBuilder::new()
///     .device(SimDevice::new(4096))
///     .store(SimStore::new())
///     .registry(Registry::new([Entry::new_u32("boot_count", 1, 0)]))
///     .build();
///
/// MEMORY.install(manager);
/// MEMORY.init().unwrap();
/// let boots = MEMORY.with(|mgr| mgr.load_u32("boot_count")).unwrap();
/// MEMORY.with(|mgr| mgr.save_u32("boot_count", boots + 1)).unwrap();
/// ```
pub struct SharedMemoryManager<D, S, const N: usize>
where
    D: FlashDevice,
    S: NvStore,
    BitsImpl<N>: Bits,
{
    inner: Mutex<RefCell<Option<MemoryManager<D, S, N>>>>,
}

impl<D, S, const N: usize> SharedMemoryManager<D, S, N>
where
    D: FlashDevice,
    S: NvStore,
    BitsImpl<N>: Bits,
{
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Installs `manager`, returning the previously installed one.
    ///
    /// # Panics
    /// Panics if called from inside [`Self::with`].
    pub fn install(&self, manager: MemoryManager<D, S, N>) -> Option<MemoryManager<D, S, N>> {
        critical_section::with(|cs| self.inner.borrow(cs).replace(Some(manager)))
    }

    /// Removes and returns the installed manager.
    ///
    /// # Panics
    /// Panics if called from inside [`Self::with`].
    pub fn take(&self) -> Option<MemoryManager<D, S, N>> {
        critical_section::with(|cs| self.inner.borrow(cs).take())
    }

    /// Runs `f` on the installed manager inside a critical section.
    ///
    /// # Errors
    /// - [`MemoryError::NotInitialized`] if no manager is installed
    /// - [`MemoryError::Busy`] if called again from inside `f`
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut MemoryManager<D, S, N>) -> Result<R, MemoryError>,
    ) -> Result<R, MemoryError> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).try_borrow_mut().map_err(|_| {
                warn!("memory manager already borrowed");
                MemoryError::Busy
            })?;
            match slot.as_mut() {
                Some(manager) => f(manager),
                None => Err(MemoryError::NotInitialized),
            }
        })
    }

    pub fn init(&self) -> Result<(), MemoryError> {
        self.with(|manager| manager.init())
    }

    pub fn load(&self, key: &str, out: &mut [u8]) -> Result<(), MemoryError> {
        self.with(|manager| manager.load(key, out))
    }

    pub fn save(&self, key: &str, data: &[u8]) -> Result<WriteOutcome, MemoryError> {
        self.with(|manager| manager.save(key, data))
    }
}

impl<D, S, const N: usize> Default for SharedMemoryManager<D, S, N>
where
    D: FlashDevice,
    S: NvStore,
    BitsImpl<N>: Bits,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::test_support::{TEST_DEFAULT, TestStore, test_manager};
    use crate::memory::sim::SimDevice;

    type TestShared = SharedMemoryManager<SimDevice, TestStore, 3>;

    #[test]
    fn empty_shared_manager_reports_not_initialized() {
        let shared = TestShared::new();
        let mut buf = [0u8; 4];
        assert_eq!(
            shared.load("test_val_1", &mut buf),
            Err(MemoryError::NotInitialized)
        );
        assert_eq!(shared.init(), Err(MemoryError::NotInitialized));
    }

    #[test]
    fn install_init_load_save() {
        let shared = TestShared::new();
        assert!(shared.install(test_manager()).is_none());

        shared.init().unwrap();

        let mut buf = [0u8; 4];
        shared.load("test_val_2", &mut buf).unwrap();
        assert_eq!(u32::from_le_bytes(buf), TEST_DEFAULT);

        shared.save("test_val_2", &55u32.to_le_bytes()).unwrap();
        assert_eq!(shared.with(|mgr| mgr.load_u32("test_val_2")), Ok(55));

        let manager = shared.take().unwrap();
        assert_eq!(manager.load_u32("test_val_2"), Ok(55));
        assert!(shared.take().is_none());
    }

    #[test]
    fn reentrant_access_is_busy() {
        let shared = TestShared::new();
        shared.install(test_manager());
        shared.init().unwrap();

        let nested = shared.with(|mgr| {
            let mut buf = [0u8; 4];
            let inner = shared.load("test_val_1", &mut buf);
            assert_eq!(inner, Err(MemoryError::Busy));
            mgr.load_u32("test_val_1")
        });
        assert_eq!(nested, Ok(TEST_DEFAULT));

        // The lock is released again afterwards
        assert_eq!(shared.with(|mgr| mgr.load_u32("test_val_1")), Ok(TEST_DEFAULT));
    }

    #[test]
    fn usable_from_static() {
        static SHARED: TestShared = TestShared::new();

        SHARED.install(test_manager());
        SHARED.init().unwrap();
        assert_eq!(
            SHARED.with(|mgr| mgr.save_u32("test_val_3", 9)),
            Ok(WriteOutcome::Written)
        );
    }
}
