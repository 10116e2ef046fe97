//! Counter example: periodic read-modify-write of registered values
//!
//! This example demonstrates:
//! - Declaring a const registry of u32 values
//! - Sharing one manager through a `static` critical-section wrapper
//! - Loading, updating and saving each value every cycle
//! - Values surviving a simulated power cycle

use embedded_memory_manager::prelude::*;

const KEYS: [&str; 3] = ["test_val_1", "test_val_2", "test_val_3"];

const REGISTRY: Registry<3> = Registry::new([
    Entry::new_u32(KEYS[0], 1, 123),
    Entry::new_u32(KEYS[1], 2, 123),
    Entry::new_u32(KEYS[2], 3, 123),
]);

type Store = SimStore<16>;

static MEMORY: SharedMemoryManager<SimDevice, Store, 3> = SharedMemoryManager::new();

/// One pass over every key: load, replace with `index + count`, save.
fn cycle(count: &mut u32) -> Result<(), MemoryError> {
    for (index, key) in KEYS.iter().enumerate() {
        let mut buf = [0u8; 4];
        MEMORY.load(key, &mut buf)?;
        let previous = u32::from_le_bytes(buf);

        let value = index as u32 + *count;
        MEMORY.save(key, &value.to_le_bytes())?;
        println!("{key}.value = {value} (was {previous})");
        *count += 1;
    }
    Ok(())
}

fn boot(store: Store) -> Result<(), MemoryError> {
    let manager = MemoryManagerBuilder::new()
        .device(SimDevice::new(4096))
        .store(store)
        .registry(REGISTRY)
        .build();

    MEMORY.install(manager);
    MEMORY.init()
}

fn main() {
    println!("keys: {KEYS:?}");
    boot(Store::new()).unwrap();

    let mut count = 0;
    for _ in 0..3 {
        println!("---------------------------------");
        cycle(&mut count).unwrap();
    }

    // Power cycle: the store keeps its records, the RAM cache does not
    let (_, mut store) = MEMORY.take().unwrap().release();
    store.power_cycle();
    boot(store).unwrap();

    for key in KEYS {
        let value = MEMORY.with(|mgr| mgr.load_u32(key)).unwrap();
        println!("after reboot {key}.value = {value}");
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_counter_example() {
        super::main();
    }
}
