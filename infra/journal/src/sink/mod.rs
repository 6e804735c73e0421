mod file;
mod memory;

pub use file::JsonFileSink;
pub use memory::MemorySink;

use crate::error::JournalError;
use std::fmt;
use stride_domain::ErrorLogEntry;

/// Persistence target mirroring the journal buffer.
///
/// Implementations receive the complete, ordered buffer (oldest first) on every change, so
/// `store` replaces whatever was persisted before.
pub trait ErrorLogSink: Send + Sync + fmt::Debug {
    /// Short label used in log events.
    fn name(&self) -> &'static str;

    /// Loads previously persisted entries, oldest first. Missing storage yields an empty list.
    ///
    /// # Errors
    /// Returns a [`JournalError`] when the backing store is unreadable or corrupt.
    fn load(&self) -> Result<Vec<ErrorLogEntry>, JournalError>;

    /// Replaces the persisted entries.
    ///
    /// # Errors
    /// Returns a [`JournalError`] when the backing store cannot be written.
    fn store(&self, entries: &[ErrorLogEntry]) -> Result<(), JournalError>;

    /// Removes all persisted entries.
    ///
    /// # Errors
    /// Returns a [`JournalError`] when the backing store cannot be cleared.
    fn clear(&self) -> Result<(), JournalError>;
}

/// Discards everything; the journal then lives in memory only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ErrorLogSink for NullSink {
    fn name(&self) -> &'static str {
        "null"
    }

    fn load(&self) -> Result<Vec<ErrorLogEntry>, JournalError> {
        Ok(Vec::new())
    }

    fn store(&self, _entries: &[ErrorLogEntry]) -> Result<(), JournalError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), JournalError> {
        Ok(())
    }
}
