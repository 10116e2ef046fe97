pub mod builder;
pub mod config;
pub mod error;
mod macros;
pub mod manager;
pub mod registry;
#[cfg(feature = "sequential-storage")]
pub mod sequential;
pub mod shared;
pub mod sim;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use builder::MemoryManagerBuilder;
pub use config::{DEFAULT_SECTOR_COUNT, ManagerConfig};
pub use error::MemoryError;
pub use manager::MemoryManager;
pub use registry::{Entry, Registry};
#[cfg(feature = "sequential-storage")]
pub use sequential::{SequentialError, SequentialStore};
pub use shared::SharedMemoryManager;
pub use sim::{SimDevice, SimError, SimStore, WriteFault};
pub use store::{FixedGeometry, FlashDevice, NvStore, PageInfo, StoreConfig};
pub use types::{Direction, MAX_VALUE_SIZE, ValueKind, WriteOutcome};

pub mod prelude {
    pub use super::{
        Direction, Entry, FixedGeometry, FlashDevice, ManagerConfig, MemoryError, MemoryManager,
        MemoryManagerBuilder, NvStore, PageInfo, Registry, SharedMemoryManager, SimDevice,
        SimStore, StoreConfig, ValueKind, WriteOutcome,
    };
    #[cfg(feature = "sequential-storage")]
    pub use super::SequentialStore;
}
