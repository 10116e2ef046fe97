//! Test support utilities - only compiled in test builds.

use crate::memory::{
    config::ManagerConfig,
    manager::MemoryManager,
    registry::{Entry, Registry},
    sim::{SimDevice, SimStore},
};

/// Default value of every entry in [`TEST_REGISTRY`].
pub const TEST_DEFAULT: u32 = 123;

/// Standard test registry: three u32 values at ids 1..=3.
pub const TEST_REGISTRY: Registry<3> = Registry::new([
    Entry::new_u32("test_val_1", 1, TEST_DEFAULT),
    Entry::new_u32("test_val_2", 2, TEST_DEFAULT),
    Entry::new_u32("test_val_3", 3, TEST_DEFAULT),
]);

pub type TestStore = SimStore<16>;
pub type TestManager = MemoryManager<SimDevice, TestStore, 3>;

pub fn test_registry() -> Registry<3> {
    TEST_REGISTRY
}

/// Uninitialized manager over an erased store.
pub fn test_manager() -> TestManager {
    test_manager_with(SimDevice::new(4096), TestStore::new())
}

/// Uninitialized manager over the given device and store.
pub fn test_manager_with(device: SimDevice, store: TestStore) -> TestManager {
    MemoryManager::new(device, store, test_registry(), ManagerConfig::new(0x8_0000))
}

/// Manager initialized over an erased store.
pub fn init_manager() -> TestManager {
    let mut manager = test_manager();
    manager.init().unwrap();
    manager
}

/// Asserts that the store's newest value for `id` is `expected`.
pub fn assert_stored(store: &TestStore, id: u16, expected: u32) {
    assert_eq!(store.peek(id), Some(&expected.to_le_bytes()[..]));
}
