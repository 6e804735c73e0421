use crate::constants::{
    DEFAULT_ATTEMPT_TIMEOUT_MS, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS,
    DEFAULT_JOURNAL_CAPACITY, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES, DEFAULT_SLOW_RTT_MS,
    JOURNAL_STORAGE_KEY,
};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration shared across the toolkit.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrideConfigInner {
    pub retry: RetryConfig,
    pub journal: JournalConfig,
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct StrideConfig {
    #[serde(flatten, default)]
    inner: Arc<StrideConfigInner>,
}

impl Deref for StrideConfig {
    type Target = StrideConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for StrideConfig {
    fn deref_mut(&mut self) -> &mut StrideConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Retry/backoff knobs. Delays are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub multiplier: u32,
    pub max_delay_ms: u64,
    /// Per-attempt deadline; `None` disables the timeout.
    pub timeout_ms: Option<u64>,
    pub require_online: bool,
}

/// Error journal capacity and persistence location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub capacity: usize,
    /// Directory holding the persisted journal. `None` keeps the journal in memory only.
    pub dir: Option<PathBuf>,
    pub storage_key: String,
}

/// Connection-quality thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub slow_rtt_ms: u64,
}

/// Logging output settings consumed by the logger bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub console: bool,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub env_filter: Option<String>,
}

// --- Default ---

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            timeout_ms: Some(DEFAULT_ATTEMPT_TIMEOUT_MS),
            require_online: false,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_JOURNAL_CAPACITY,
            dir: None,
            storage_key: JOURNAL_STORAGE_KEY.to_owned(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { slow_rtt_ms: DEFAULT_SLOW_RTT_MS }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), console: true, dir: None, json: false, env_filter: None }
    }
}
