use crate::category::ErrorCategory;
use crate::code::ErrorCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Open key-value details attached by the classifier (vendor codes, status, step data).
pub type ErrorContext = BTreeMap<String, Value>;

/// A classified failure, ready to be shown to the user and journaled.
///
/// `category`, `user_message` and `retryable` always agree with the registry entry for
/// `code` when built through [`EnrollmentError::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentError {
    pub category: ErrorCategory,
    pub code: ErrorCode,
    /// Internal, developer-facing description.
    pub message: String,
    pub user_message: String,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: ErrorContext,
    pub timestamp: DateTime<Utc>,
}

impl EnrollmentError {
    /// Builds an error from the registry entry for `code`, stamped with the current time.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            category: code.category(),
            code,
            message: message.into(),
            user_message: code.user_message().to_owned(),
            retryable: code.is_retryable(),
            context: ErrorContext::new(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// `true` for the connectivity-loss state that clears itself once back online.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.code == ErrorCode::Offline
    }
}

impl fmt::Display for EnrollmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for EnrollmentError {}
