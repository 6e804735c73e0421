use std::time::Duration;
use stride_domain::config::RetryConfig;
use stride_domain::constants::{
    DEFAULT_ATTEMPT_TIMEOUT_MS, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS,
    DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES,
};

/// Backoff and timeout parameters for [`crate::RetryEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total invocations are at most `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    /// Deadline for a single attempt. `None` lets attempts run unbounded.
    pub timeout: Option<Duration>,
    /// Refuse to start or continue while the network monitor reports offline.
    ///
    /// Only takes effect on an engine built with [`crate::RetryEngine::with_network`];
    /// without a monitor the engine logs a warning per call and runs unchecked.
    pub require_online: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            timeout: Some(Duration::from_millis(DEFAULT_ATTEMPT_TIMEOUT_MS)),
            require_online: false,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            multiplier: config.multiplier,
            max_delay: Duration::from_millis(config.max_delay_ms),
            timeout: config.timeout_ms.map(Duration::from_millis),
            require_online: config.require_online,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn require_online(mut self, required: bool) -> Self {
        self.require_online = required;
        self
    }

    /// Wait before retry number `retry` (1-based): `min(base * multiplier^(retry-1), max_delay)`.
    ///
    /// Saturates instead of overflowing, so large retry numbers settle on `max_delay`.
    /// `delay_for(0)` is zero.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.saturating_pow(retry - 1);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Backoff waits for every retry the policy allows, in order. Lazy, so huge
    /// `max_retries` values cost nothing until consumed.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + use<> {
        let policy = *self;
        (1..=policy.max_retries).map(move |retry| policy.delay_for(retry))
    }

    /// Sum of every backoff wait in [`RetryPolicy::schedule`].
    ///
    /// Once two consecutive delays are equal the sequence stays constant (capped or
    /// saturated), so the tail is multiplied out instead of walked.
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        let mut total = Duration::ZERO;
        for retry in 1..=self.max_retries {
            let delay = self.delay_for(retry);
            if retry < self.max_retries && self.delay_for(retry + 1) == delay {
                let remaining = self.max_retries - retry + 1;
                return total.saturating_add(delay.saturating_mul(remaining));
            }
            total = total.saturating_add(delay);
        }
        total
    }

    /// Upper bound on the wall time of one engine call: every attempt hitting its timeout
    /// plus every backoff wait. `None` when attempts are not time-bounded.
    #[must_use]
    pub fn worst_case_latency(&self) -> Option<Duration> {
        let timeout = self.timeout?;
        let attempts = self.max_retries.saturating_add(1);
        Some(timeout.saturating_mul(attempts).saturating_add(self.total_backoff()))
    }
}
