//! A `no_std`, no-alloc key-value memory manager for embedded flash.
//!
//! Named values are declared once in a static registry, mirrored in RAM and
//! persisted to a log-structured flash store addressed by small integer ids.
//! Loads are served from RAM; saves update RAM and then write through to
//! flash.
//!
//! # Features
//!
//! - **Zero heap allocation** - Registry and cache are fixed-size arrays
//! - **Const registry** - Duplicate keys or ids are rejected at compile time
//! - **Typed access** - `load_u32`, `save_f32`, ... checked against the declared kind
//! - **Write-through with retry** - Failed writes are tracked and replayed by `sync`
//! - **Pluggable storage** - Any [`NvStore`](memory::NvStore), with a simulated
//!   store for hosts and a `sequential-storage` backend behind a feature
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  key   ┌───────────────────────┐   id    ┌──────────────┐
//! │ Application  │───────▶│  MemoryManager        │────────▶│  NvStore     │
//! │              │        │                       │  write  │  (flash log) │
//! │  load / save │◀───────│  Registry<N> (RAM)    │◀────────│              │
//! │              │ cached │  restored / unsynced  │  init   │              │
//! └──────────────┘        └───────────────────────┘  read   └──────────────┘
//! ```
//!
//! - **Init** mounts the store, then restores each entry or writes its default
//! - **Load** copies from the RAM cache and never touches flash
//! - **Save** updates the cache first, then writes the value under its id
//!
//! # Example
//!
//! ```rust,no_run
//! use embedded_memory_manager::prelude::*;
//!
//! const REGISTRY: Registry<2> = Registry::new([
//!     Entry::new_u32("boot_count", 1, 0),
//!     Entry::new_f32("gain", 2, 0.5),
//! ]);
//!
//! let mut manager = MemoryManagerBuilder::new()
//!     .device(SimDevice::new(4096))
//!     .store(SimStore::<8>::new())
//!     .registry(REGISTRY)
//!     .partition_offset(0x7_E000)
//!     .build();
//!
//! manager.init().unwrap();
//!
//! let boots = manager.load_u32("boot_count").unwrap();
//! manager.save_u32("boot_count", boots + 1).unwrap();
//!
//! // Raw byte access with an explicit direction
//! let mut buf = [0u8; 4];
//! manager.access(Direction::Load, "gain", &mut buf).unwrap();
//! assert_eq!(f32::from_le_bytes(buf), 0.5);
//! ```

#![deny(unsafe_code)]
#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod memory;

pub mod prelude {
    pub use crate::memory::prelude::*;
}
