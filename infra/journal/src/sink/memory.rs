use crate::error::JournalError;
use crate::sink::ErrorLogSink;
use parking_lot::Mutex;
use std::sync::Arc;
use stride_domain::ErrorLogEntry;

/// In-process sink. Clones share the same storage, which makes it handy for inspecting
/// what a journal persisted.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<ErrorLogEntry>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemorySink {
    /// Creates a sink pre-populated with `entries`, as if written by an earlier session.
    #[must_use]
    pub fn with_entries(entries: Vec<ErrorLogEntry>) -> Self {
        Self { entries: Arc::new(Mutex::new(entries)), writes: Arc::default() }
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ErrorLogEntry> {
        self.entries.lock().clone()
    }

    /// Number of `store` calls observed so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }
}

impl ErrorLogSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> Result<Vec<ErrorLogEntry>, JournalError> {
        Ok(self.snapshot())
    }

    fn store(&self, entries: &[ErrorLogEntry]) -> Result<(), JournalError> {
        *self.entries.lock() = entries.to_vec();
        *self.writes.lock() += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), JournalError> {
        self.entries.lock().clear();
        Ok(())
    }
}
