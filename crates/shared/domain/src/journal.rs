use crate::category::ErrorCategory;
use crate::error::EnrollmentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One journaled failure. Entries are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    pub id: String,
    pub error: EnrollmentError,
    /// Wizard step that produced the error (e.g. `"otp"`, `"payment"`).
    pub step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub session_id: String,
    pub user_agent: String,
    pub url: String,
}

/// Per-session details stamped onto every journal entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionContext {
    pub session_id: String,
    pub user_id: Option<String>,
    pub user_agent: String,
    pub url: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), ..Self::default() }
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Aggregate view over the journal contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub total: usize,
    pub by_category: BTreeMap<ErrorCategory, usize>,
    pub retryable: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

impl JournalStats {
    /// Folds entries (in any order) into counters and the observed time range.
    pub fn collect<'a>(entries: impl IntoIterator<Item = &'a ErrorLogEntry>) -> Self {
        entries.into_iter().fold(Self::default(), |mut stats, entry| {
            let at = entry.error.timestamp;
            stats.total += 1;
            *stats.by_category.entry(entry.error.category).or_default() += 1;
            if entry.error.retryable {
                stats.retryable += 1;
            }
            stats.oldest = Some(stats.oldest.map_or(at, |t| t.min(at)));
            stats.newest = Some(stats.newest.map_or(at, |t| t.max(at)));
            stats
        })
    }

    #[must_use]
    pub fn count(&self, category: ErrorCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or_default()
    }
}
