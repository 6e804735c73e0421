//! # Domain Models
//!
//! Pure data types for enrollment failure handling: the error taxonomy, the registry of
//! error codes with their user-facing messages, the journal entry shape and the
//! configuration tree. Keep it lean: no I/O, networking, or heavy logic.

pub mod category;
pub mod code;
pub mod config;
pub mod constants;
pub mod error;
pub mod journal;

pub use category::ErrorCategory;
pub use code::ErrorCode;
pub use error::{EnrollmentError, ErrorContext};
pub use journal::{ErrorLogEntry, JournalStats, SessionContext};
