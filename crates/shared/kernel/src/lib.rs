//! Kernel utilities shared across crates.
//! Keep this crate lightweight; it re-exports helpers for IDs and layered config loading.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous IDs (journal entries, session ids):
//! ```rust
//! # use stride_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use stride_kernel::config::load_stride_config;
//!
//! let cfg = load_stride_config(Some("stride.toml")).unwrap();
//! assert!(cfg.journal.capacity > 0);
//! ```
pub mod config;

pub use nanoid::nanoid;
pub use stride_domain as domain;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}

/// Prefixed session identifier, e.g. `sess_4fKz9QxYb2Mn`.
#[must_use]
pub fn session_id() -> String {
    format!("sess_{}", safe_nanoid!())
}
