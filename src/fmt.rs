//! Internal logging macros.
//!
//! - `defmt` feature: forwards to `defmt`
//! - host tests: prints with a level prefix
//! - otherwise: no-op (arguments are still borrowed so they count as used)

#![allow(unused_macros)]

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(all(not(feature = "defmt"), test))]
        ::std::println!(concat!("[DEBUG] ", $s) $(, $x)*);
        #[cfg(not(any(feature = "defmt", test)))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($s $(, $x)*);
        #[cfg(all(not(feature = "defmt"), test))]
        ::std::println!(concat!("[INFO] ", $s) $(, $x)*);
        #[cfg(not(any(feature = "defmt", test)))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(all(not(feature = "defmt"), test))]
        ::std::println!(concat!("[WARN] ", $s) $(, $x)*);
        #[cfg(not(any(feature = "defmt", test)))]
        let _ = ($( & $x ),*);
    }};
}
