use crate::memory::{
    MemoryError,
    macros::{impl_entry_ctor, impl_entry_ctors},
    types::{MAX_VALUE_SIZE, ValueKind},
};

/// One key ↔ storage id ↔ value binding.
///
/// Key, id, kind and default are fixed at build time; only the cached value
/// changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    key: &'static str,
    id: u16,
    kind: ValueKind,
    value: [u8; MAX_VALUE_SIZE],
    default: [u8; MAX_VALUE_SIZE],
}

impl Entry {
    const fn from_parts(
        key: &'static str,
        id: u16,
        kind: ValueKind,
        default: [u8; MAX_VALUE_SIZE],
    ) -> Self {
        Self {
            key,
            id,
            kind,
            value: default,
            default,
        }
    }

    impl_entry_ctors!();

    /// Key used to address this entry.
    #[inline]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Storage id used by the flash store.
    #[inline]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Declared value kind.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Encoded value size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.kind.size()
    }

    /// Cached value bytes.
    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value[..self.size()]
    }

    /// Compile-time default bytes.
    #[inline]
    pub fn default_value(&self) -> &[u8] {
        &self.default[..self.size()]
    }

    pub(crate) fn value_mut(&mut self) -> &mut [u8] {
        let size = self.size();
        &mut self.value[..size]
    }

    pub(crate) fn reset_to_default(&mut self) {
        self.value = self.default;
    }
}

const fn widen(bytes: &[u8]) -> [u8; MAX_VALUE_SIZE] {
    let mut out = [0u8; MAX_VALUE_SIZE];
    let mut i = 0;
    while i < bytes.len() {
        out[i] = bytes[i];
        i += 1;
    }
    out
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Returns the first uniqueness violation among `entries`, if any.
const fn find_duplicate(entries: &[Entry]) -> Option<MemoryError> {
    let mut i = 0;
    while i < entries.len() {
        let mut j = i + 1;
        while j < entries.len() {
            if str_eq(entries[i].key, entries[j].key) {
                return Some(MemoryError::DuplicateKey);
            }
            if entries[i].id == entries[j].id {
                return Some(MemoryError::DuplicateId);
            }
            j += 1;
        }
        i += 1;
    }
    None
}

/// Fixed-length table of registry entries.
///
/// Keys and ids are pairwise distinct. Lookups are a linear scan, which is
/// intended for small, statically known key sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<const N: usize> {
    entries: [Entry; N],
}

impl<const N: usize> Registry<N> {
    /// Creates a registry from statically declared entries.
    ///
    /// # Panics
    /// Panics if two entries share a key or an id. In a `const` context this
    /// is a compile-time error.
    ///
    /// # Example
    /// ```
    /// use embedded_memory_manager::memory::{Entry, Registry};
    ///
    /// const REGISTRY: Registry<2> = Registry::new([
    ///     Entry::new_u32("boot_count", 1, 0),
    ///     Entry::new_u16("brightness", 2, 128),
    /// ]);
    ///
    /// assert_eq!(REGISTRY.resolve("brightness"), Some(1));
    /// assert_eq!(REGISTRY.resolve("missing"), None);
    /// ```
    pub const fn new(entries: [Entry; N]) -> Self {
        match find_duplicate(&entries) {
            Some(MemoryError::DuplicateKey) => panic!("duplicate key in registry"),
            Some(_) => panic!("duplicate storage id in registry"),
            None => Self { entries },
        }
    }

    /// Creates a registry, reporting duplicates instead of panicking.
    pub fn try_new(entries: [Entry; N]) -> Result<Self, MemoryError> {
        match find_duplicate(&entries) {
            Some(err) => Err(err),
            None => Ok(Self { entries }),
        }
    }

    /// Returns the index of the entry with exactly this key.
    pub fn resolve(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    /// Number of entries.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }

    /// Looks up an entry by key.
    pub fn find(&self, key: &str) -> Option<&Entry> {
        self.resolve(key).and_then(|index| self.get(index))
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> core::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> core::slice::IterMut<'_, Entry> {
        self.entries.iter_mut()
    }
}

impl<'a, const N: usize> IntoIterator for &'a Registry<N> {
    type Item = &'a Entry;
    type IntoIter = core::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::test_support::{TEST_REGISTRY, test_registry};

    #[test]
    fn entry_ctors_encode_little_endian_defaults() {
        let entry = Entry::new_u32("a", 1, 0x1234_5678);
        assert_eq!(entry.kind(), ValueKind::U32);
        assert_eq!(entry.value(), &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(entry.default_value(), entry.value());

        let entry = Entry::new_i16("b", 2, -2);
        assert_eq!(entry.size(), 2);
        assert_eq!(entry.value(), &[0xFE, 0xFF]);

        let entry = Entry::new_f32("c", 3, 1.5);
        assert_eq!(entry.value(), &1.5f32.to_le_bytes());

        let entry = Entry::new_u8("d", 4, 7);
        assert_eq!(entry.value(), &[7]);
    }

    #[test]
    fn resolve_finds_each_key_by_exact_match() {
        let registry = test_registry();
        assert_eq!(registry.resolve("test_val_1"), Some(0));
        assert_eq!(registry.resolve("test_val_2"), Some(1));
        assert_eq!(registry.resolve("test_val_3"), Some(2));

        // No prefix or case-insensitive matching
        assert_eq!(registry.resolve("test_val"), None);
        assert_eq!(registry.resolve("TEST_VAL_1"), None);
        assert_eq!(registry.resolve(""), None);
    }

    #[test]
    fn const_registry_is_usable() {
        assert_eq!(TEST_REGISTRY.len(), 3);
        assert_eq!(TEST_REGISTRY.find("test_val_2").map(Entry::id), Some(2));
    }

    #[test]
    fn try_new_rejects_duplicate_keys() {
        let result = Registry::try_new([Entry::new_u32("a", 1, 0), Entry::new_u32("a", 2, 0)]);
        assert_eq!(result, Err(MemoryError::DuplicateKey));
    }

    #[test]
    fn try_new_rejects_duplicate_ids() {
        let result = Registry::try_new([
            Entry::new_u32("a", 1, 0),
            Entry::new_u32("b", 2, 0),
            Entry::new_u32("c", 1, 0),
        ]);
        assert_eq!(result, Err(MemoryError::DuplicateId));
    }

    #[test]
    #[should_panic(expected = "duplicate key")]
    fn new_panics_on_duplicate_key() {
        let _ = Registry::new([Entry::new_u32("a", 1, 0), Entry::new_u32("a", 2, 0)]);
    }

    #[test]
    fn empty_registry() {
        let registry: Registry<0> = Registry::new([]);
        assert!(registry.is_empty());
        assert_eq!(registry.resolve("anything"), None);
    }

    #[test]
    fn reset_to_default_restores_cached_value() {
        let mut entry = Entry::new_u32("a", 1, 123);
        entry.value_mut().copy_from_slice(&456u32.to_le_bytes());
        assert_eq!(entry.value(), &456u32.to_le_bytes());
        entry.reset_to_default();
        assert_eq!(entry.value(), &123u32.to_le_bytes());
    }
}
