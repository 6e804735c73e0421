/// Journal ring buffer capacity; the oldest entry is dropped beyond this.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 100;
/// Key (and file stem) under which the journal is persisted.
pub const JOURNAL_STORAGE_KEY: &str = "enrollment_error_logs";

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 30_000;

/// Round-trip time above which a connection is reported as slow.
pub const DEFAULT_SLOW_RTT_MS: u64 = 1_000;

/// Vendor prefix carried by phone-auth provider error codes.
pub const AUTH_CODE_PREFIX: &str = "auth/";
