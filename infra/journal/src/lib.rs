//! # Error Journal
//!
//! An append-only, capacity-bounded log of classified enrollment failures.
//!
//! Every [`ErrorJournal::record`] call stamps the error with an id and the current
//! [`SessionContext`], appends it, evicts the oldest entry once the capacity is exceeded,
//! mirrors the whole buffer to an [`ErrorLogSink`] and emits a structured `tracing` event.
//! Sink failures are logged and never surface to the caller. Sink writes happen outside the
//! buffer lock and, inside a tokio runtime, on the blocking pool; await
//! [`ErrorJournal::flush`] when the persisted state must be current.
//!
//! ## Example
//!
//! ```rust
//! use stride_domain::{EnrollmentError, ErrorCode};
//! use stride_journal::{ErrorJournal, MemorySink};
//!
//! let journal = ErrorJournal::builder().capacity(10).sink(MemorySink::default()).build();
//! let entry = journal.record(EnrollmentError::new(ErrorCode::NetworkError, "fetch failed"), "payment");
//!
//! assert_eq!(journal.len(), 1);
//! assert_eq!(journal.find(&entry.id).map(|e| e.step), Some("payment".to_owned()));
//! ```

mod error;
mod journal;
mod sink;

pub use crate::error::{JournalError, JournalErrorExt};
pub use crate::journal::{ErrorJournal, ErrorJournalBuilder};
pub use crate::sink::{ErrorLogSink, JsonFileSink, MemorySink, NullSink};
pub use stride_domain::{ErrorLogEntry, JournalStats, SessionContext};
