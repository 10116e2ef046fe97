/// Generates a `const` entry constructor for a single primitive type.
macro_rules! impl_entry_ctor {
    ($type:ident, $kind:ident) => {
        paste::paste! {
            #[doc = "Declares an entry holding a little-endian `" $type "` with the given default."]
            #[inline]
            pub const fn [<new_ $type>](key: &'static str, id: u16, default: $type) -> Self {
                Self::from_parts(key, id, ValueKind::$kind, widen(&default.to_le_bytes()))
            }
        }
    };
}

/// Generates entry constructors for all supported value kinds.
macro_rules! impl_entry_ctors {
    () => {
        impl_entry_ctor!(u8, U8);
        impl_entry_ctor!(i8, I8);
        impl_entry_ctor!(u16, U16);
        impl_entry_ctor!(i16, I16);
        impl_entry_ctor!(u32, U32);
        impl_entry_ctor!(i32, I32);
        impl_entry_ctor!(f32, F32);
    };
}

/// Generates typed load/save methods for a single primitive type.
macro_rules! impl_typed_access {
    ($type:ident, $kind:ident) => {
        paste::paste! {
            #[doc = "Loads the cached `" $type "` stored under `key`."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = "[`MemoryError::TypeMismatch`] if the entry is not declared as `" $type "`."]
            pub fn [<load_ $type>](&self, key: &str) -> Result<$type, MemoryError> {
                let mut buf = [0u8; ValueKind::$kind.size()];
                self.load_kind(key, ValueKind::$kind, &mut buf)?;
                Ok(<$type>::from_le_bytes(buf))
            }

            #[doc = "Saves a `" $type "` under `key` and persists it."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = "[`MemoryError::TypeMismatch`] if the entry is not declared as `" $type "`."]
            pub fn [<save_ $type>](
                &mut self,
                key: &str,
                value: $type,
            ) -> Result<WriteOutcome, MemoryError> {
                self.save_kind(key, ValueKind::$kind, &value.to_le_bytes())
            }
        }
    };
}

/// Generates typed load/save methods for all supported value kinds.
macro_rules! impl_typed_accesses {
    () => {
        impl_typed_access!(u8, U8);
        impl_typed_access!(i8, I8);
        impl_typed_access!(u16, U16);
        impl_typed_access!(i16, I16);
        impl_typed_access!(u32, U32);
        impl_typed_access!(i32, I32);
        impl_typed_access!(f32, F32);
    };
}

pub(super) use impl_entry_ctor;
pub(super) use impl_entry_ctors;
pub(super) use impl_typed_access;
pub(super) use impl_typed_accesses;
