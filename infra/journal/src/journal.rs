use crate::error::{JournalError, JournalErrorExt};
use crate::sink::{ErrorLogSink, JsonFileSink, MemorySink, NullSink};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use stride_domain::config::JournalConfig;
use stride_domain::constants::DEFAULT_JOURNAL_CAPACITY;
use stride_domain::{EnrollmentError, ErrorCategory, ErrorLogEntry, JournalStats, SessionContext};
use stride_kernel::safe_nanoid;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Capacity-bounded, append-only error log.
///
/// Cloning is cheap and every clone writes to the same buffer, so one journal can be handed
/// to all components of an enrollment session.
///
/// Sink writes never happen under the buffer lock. Inside a tokio runtime they run on the
/// blocking pool; [`ErrorJournal::flush`] waits until the newest state is persisted.
/// Outside a runtime they run inline before `record` returns.
#[derive(Clone)]
pub struct ErrorJournal {
    inner: Arc<JournalInner>,
}

struct JournalInner {
    capacity: usize,
    entries: Mutex<VecDeque<ErrorLogEntry>>,
    /// Bumped under the `entries` lock on every buffer change.
    generation: AtomicU64,
    /// Generation the sink last stored. Held for the whole write, which serializes writers;
    /// lock order is `persisted` before `entries`.
    persisted: Mutex<u64>,
    session: RwLock<SessionContext>,
    sink: Box<dyn ErrorLogSink>,
}

impl fmt::Debug for ErrorJournal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorJournal")
            .field("capacity", &self.inner.capacity)
            .field("len", &self.len())
            .field("sink", &self.inner.sink.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ErrorJournal`].
#[derive(Debug)]
pub struct ErrorJournalBuilder {
    capacity: usize,
    session: Option<SessionContext>,
    sink: Option<Box<dyn ErrorLogSink>>,
}

impl ErrorJournalBuilder {
    /// Maximum number of retained entries. Zero is bumped to one.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: impl ErrorLogSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Session details stamped onto every entry. A fresh session id is generated when
    /// omitted or empty.
    #[must_use]
    pub fn session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    pub fn build(self) -> ErrorJournal {
        let mut session = self.session.unwrap_or_default();
        if session.session_id.is_empty() {
            session.session_id = stride_kernel::session_id();
        }
        let sink = self.sink.unwrap_or_else(|| Box::new(NullSink));

        debug!(capacity = self.capacity, sink = sink.name(), session = %session.session_id, "Error journal created");

        ErrorJournal {
            inner: Arc::new(JournalInner {
                capacity: self.capacity,
                entries: Mutex::new(VecDeque::with_capacity(self.capacity)),
                generation: AtomicU64::new(0),
                persisted: Mutex::new(0),
                session: RwLock::new(session),
                sink,
            }),
        }
    }
}

impl ErrorJournal {
    pub fn builder() -> ErrorJournalBuilder {
        ErrorJournalBuilder { capacity: DEFAULT_JOURNAL_CAPACITY, session: None, sink: None }
    }

    /// In-memory journal with the default capacity.
    pub fn in_memory() -> Self {
        Self::builder().sink(MemorySink::default()).build()
    }

    /// Builds a journal from the `[journal]` config section: a [`JsonFileSink`] under
    /// `dir` when set, memory otherwise. Previously persisted entries are restored.
    pub fn from_config(config: &JournalConfig, session: SessionContext) -> Self {
        let builder = Self::builder().capacity(config.capacity).session(session);
        let journal = match &config.dir {
            Some(dir) => builder.sink(JsonFileSink::new(dir, &config.storage_key)).build(),
            None => builder.sink(MemorySink::default()).build(),
        };

        if let Err(err) = journal.restore() {
            warn!(error = %err, kind = err.kind(), "Persisted error journal ignored");
        }
        journal
    }

    /// Appends a classified error for `step`, evicting the oldest entry past capacity.
    ///
    /// Never fails: persistence problems are logged as warnings. Inside a tokio runtime
    /// the sink write is handed to the blocking pool.
    pub fn record(&self, error: EnrollmentError, step: impl Into<String>) -> ErrorLogEntry {
        let entry = {
            let session = self.inner.session.read();
            ErrorLogEntry {
                id: format!("err_{}", safe_nanoid!()),
                error,
                step: step.into(),
                user_id: session.user_id.clone(),
                session_id: session.session_id.clone(),
                user_agent: session.user_agent.clone(),
                url: session.url.clone(),
            }
        };

        warn!(
            target: "stride::journal",
            id = %entry.id,
            code = %entry.error.code,
            category = %entry.error.category,
            step = %entry.step,
            retryable = entry.error.retryable,
            detail = %entry.error.message,
            "Enrollment error recorded"
        );

        {
            let mut entries = self.inner.entries.lock();
            entries.push_back(entry.clone());
            while entries.len() > self.inner.capacity {
                if let Some(evicted) = entries.pop_front() {
                    debug!(id = %evicted.id, "Evicted oldest journal entry");
                }
            }
            self.inner.generation.fetch_add(1, Ordering::Relaxed);
        }
        self.schedule_persist();

        entry
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<ErrorLogEntry> {
        self.inner.entries.lock().iter().cloned().collect()
    }

    /// Up to `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<ErrorLogEntry> {
        self.inner.entries.lock().iter().rev().take(n).cloned().collect()
    }

    pub fn find(&self, id: &str) -> Option<ErrorLogEntry> {
        self.inner.entries.lock().iter().find(|e| e.id == id).cloned()
    }

    /// Like [`ErrorJournal::find`] but reports a missing id as an error.
    ///
    /// # Errors
    /// Returns [`JournalError::EntryNotFound`] when no entry carries `id`.
    pub fn get(&self, id: &str) -> Result<ErrorLogEntry, JournalError> {
        self.find(id).ok_or_else(|| JournalError::EntryNotFound {
            message: id.to_owned().into(),
            context: None,
        })
    }

    pub fn by_category(&self, category: ErrorCategory) -> Vec<ErrorLogEntry> {
        self.filtered(|e| e.error.category == category)
    }

    pub fn by_step(&self, step: &str) -> Vec<ErrorLogEntry> {
        self.filtered(|e| e.step == step)
    }

    pub fn stats(&self) -> JournalStats {
        JournalStats::collect(self.inner.entries.lock().iter())
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn session(&self) -> SessionContext {
        self.inner.session.read().clone()
    }

    /// Sets (login) or clears (logout) the user id stamped onto subsequent entries.
    pub fn set_user(&self, user_id: Option<String>) {
        self.inner.session.write().user_id = user_id;
    }

    /// Drops every entry from memory and from the sink.
    ///
    /// # Errors
    /// Returns the sink error when persisted entries could not be removed. The in-memory
    /// buffer is cleared regardless.
    pub fn clear(&self) -> Result<(), JournalError> {
        let mut persisted = self.inner.persisted.lock();
        let dropped = {
            let mut entries = self.inner.entries.lock();
            let dropped = entries.len();
            entries.clear();
            dropped
        };
        // Pending writes hold older generations and are skipped from here on.
        *persisted = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        drop(persisted);

        self.inner.sink.clear().context("Failed to clear journal sink")?;
        info!(dropped, "Error journal cleared");
        Ok(())
    }

    /// Serializes all entries (oldest first) as a pretty JSON array.
    ///
    /// # Errors
    /// Returns [`JournalError::Serialization`] if encoding fails.
    pub fn export_json(&self) -> Result<String, JournalError> {
        let entries = self.entries();
        serde_json::to_string_pretty(&entries).context("Failed to export journal")
    }

    /// Replaces the in-memory buffer with what the sink holds, keeping the newest
    /// `capacity` entries. Returns the number of restored entries.
    ///
    /// # Errors
    /// Returns the sink error when persisted entries cannot be read.
    pub fn restore(&self) -> Result<usize, JournalError> {
        let mut loaded = self.inner.sink.load()?;
        let excess = loaded.len().saturating_sub(self.inner.capacity);
        loaded.drain(..excess);

        let restored = loaded.len();
        let mut persisted = self.inner.persisted.lock();
        *self.inner.entries.lock() = loaded.into();
        *persisted = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        drop(persisted);

        debug!(restored, dropped = excess, sink = self.inner.sink.name(), "Error journal restored");
        Ok(restored)
    }

    fn filtered(&self, predicate: impl Fn(&ErrorLogEntry) -> bool) -> Vec<ErrorLogEntry> {
        self.inner.entries.lock().iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// Waits until the sink holds the current buffer.
    ///
    /// The write runs on the blocking pool; failures are logged like in
    /// [`ErrorJournal::record`].
    pub async fn flush(&self) {
        let journal = self.clone();
        if let Err(err) = tokio::task::spawn_blocking(move || journal.persist_latest()).await {
            warn!(error = %err, "Journal flush task failed");
        }
    }

    fn schedule_persist(&self) {
        match Handle::try_current() {
            Ok(handle) => {
                let journal = self.clone();
                drop(handle.spawn_blocking(move || journal.persist_latest()));
            },
            Err(_) => self.persist_latest(),
        }
    }

    /// Stores a snapshot of the buffer unless a newer or equal generation is already stored.
    fn persist_latest(&self) {
        let mut persisted = self.inner.persisted.lock();
        let (snapshot, generation) = {
            let entries = self.inner.entries.lock();
            let generation = self.inner.generation.load(Ordering::Relaxed);
            if generation <= *persisted {
                return;
            }
            (entries.iter().cloned().collect::<Vec<_>>(), generation)
        };

        match self.inner.sink.store(&snapshot) {
            Ok(()) => *persisted = generation,
            Err(err) => warn!(
                sink = self.inner.sink.name(),
                kind = err.kind(),
                error = %err,
                "Failed to persist error journal"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_domain::ErrorCode;

    fn journal(capacity: usize) -> (ErrorJournal, MemorySink) {
        let sink = MemorySink::default();
        let journal = ErrorJournal::builder()
            .capacity(capacity)
            .session(SessionContext::new("sess_unit").user_agent("tests").url("/enroll"))
            .sink(sink.clone())
            .build();
        (journal, sink)
    }

    #[test]
    fn record_stamps_session_and_mirrors_to_sink() {
        let (journal, sink) = journal(5);
        let entry = journal.record(EnrollmentError::new(ErrorCode::InvalidOtp, "bad code"), "otp");

        assert!(entry.id.starts_with("err_"));
        assert_eq!(entry.session_id, "sess_unit");
        assert_eq!(entry.user_agent, "tests");
        assert_eq!(entry.url, "/enroll");
        assert_eq!(entry.user_id, None);
        assert_eq!(sink.snapshot(), vec![entry]);
        assert_eq!(sink.writes(), 1);
    }

    #[test]
    fn user_id_follows_login_and_logout() {
        let (journal, _) = journal(5);
        journal.set_user(Some("user_7".to_owned()));
        let first = journal.record(EnrollmentError::new(ErrorCode::ServerError, "500"), "review");
        journal.set_user(None);
        let second = journal.record(EnrollmentError::new(ErrorCode::ServerError, "500"), "review");

        assert_eq!(first.user_id.as_deref(), Some("user_7"));
        assert_eq!(second.user_id, None);
    }

    #[test]
    fn generated_session_id_when_missing() {
        let journal = ErrorJournal::builder().build();
        assert!(journal.session().session_id.starts_with("sess_"));
    }

    #[test]
    fn zero_capacity_keeps_latest_entry() {
        let (journal, _) = journal(0);
        journal.record(EnrollmentError::new(ErrorCode::Offline, "a"), "otp");
        let last = journal.record(EnrollmentError::new(ErrorCode::Offline, "b"), "otp");
        assert_eq!(journal.entries(), vec![last]);
    }

    #[test]
    fn missing_entry_lookup_is_an_error() {
        let (journal, _) = journal(5);
        assert_eq!(journal.get("err_nope").unwrap_err().kind(), "EntryNotFound");
    }
}
