use crate::error::RetryError;
use crate::network::NetworkMonitor;
use crate::policy::RetryPolicy;
use std::fmt;
use std::future::{Future, pending};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type RetryIf<E> = Box<dyn Fn(&RetryError<E>) -> bool + Send + Sync>;
type OnRetry<E> = Box<dyn Fn(u32, Duration, &RetryError<E>) + Send + Sync>;
type OnExhausted<E> = Box<dyn Fn(&RetryError<E>) + Send + Sync>;

/// Where a retried call currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPhase {
    #[default]
    Idle,
    Running,
    /// Backing off before the next attempt.
    Waiting { delay: Duration },
    Succeeded,
    /// Failed with an error the retry condition rejected.
    Failed,
    Exhausted,
    Offline,
    Cancelled,
}

/// Progress snapshot published on the optional per-call channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryProgress {
    /// 1-based number of the current (or last) attempt; 0 before the first one starts.
    pub attempt: u32,
    /// Retries performed so far, i.e. `attempt - 1` once running.
    pub retry_count: u32,
    pub phase: RetryPhase,
}

impl RetryProgress {
    /// Channel for a single call; hand the sender to [`RetryHooks::progress`].
    #[must_use]
    pub fn channel() -> (watch::Sender<Self>, watch::Receiver<Self>) {
        watch::channel(Self::default())
    }

    #[must_use]
    pub const fn is_retrying(&self) -> bool {
        self.retry_count > 0 && matches!(self.phase, RetryPhase::Running | RetryPhase::Waiting { .. })
    }
}

/// Per-call customization of a [`RetryEngine::run_with`] call.
///
/// The retry condition sees every failed attempt, operation errors and timeouts alike.
pub struct RetryHooks<E> {
    retry_if: Option<RetryIf<E>>,
    on_retry: Option<OnRetry<E>>,
    on_exhausted: Option<OnExhausted<E>>,
    progress: Option<watch::Sender<RetryProgress>>,
    cancel: Option<CancellationToken>,
}

impl<E> Default for RetryHooks<E> {
    fn default() -> Self {
        Self { retry_if: None, on_retry: None, on_exhausted: None, progress: None, cancel: None }
    }
}

impl<E> fmt::Debug for RetryHooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryHooks")
            .field("retry_if", &self.retry_if.is_some())
            .field("on_retry", &self.on_retry.is_some())
            .field("on_max_retries_reached", &self.on_exhausted.is_some())
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<E> RetryHooks<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether a failed attempt ([`RetryError::Operation`] or
    /// [`RetryError::TimedOut`]) may be retried. Defaults to always.
    #[must_use]
    pub fn retry_if(
        mut self,
        predicate: impl Fn(&RetryError<E>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.retry_if = Some(Box::new(predicate));
        self
    }

    /// Called before each backoff wait with the failed attempt number, the upcoming delay
    /// and the failure. Callbacks added more than once all run, in registration order.
    #[must_use]
    pub fn on_retry(
        mut self,
        callback: impl Fn(u32, Duration, &RetryError<E>) + Send + Sync + 'static,
    ) -> Self
    where
        E: 'static,
    {
        let chained: OnRetry<E> = match self.on_retry.take() {
            Some(previous) => {
                Box::new(move |attempt: u32, delay: Duration, failure: &RetryError<E>| {
                    previous(attempt, delay, failure);
                    callback(attempt, delay, failure);
                })
            },
            None => Box::new(callback),
        };
        self.on_retry = Some(chained);
        self
    }

    /// Called once when the last allowed attempt fails.
    #[must_use]
    pub fn on_max_retries_reached(
        mut self,
        callback: impl Fn(&RetryError<E>) + Send + Sync + 'static,
    ) -> Self {
        self.on_exhausted = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn progress(mut self, sender: watch::Sender<RetryProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Aborts an in-flight attempt or backoff wait once `token` is cancelled.
    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn should_retry(&self, failure: &RetryError<E>) -> bool {
        self.retry_if.as_ref().is_none_or(|predicate| predicate(failure))
    }

    fn publish(&self, attempt: u32, phase: RetryPhase) {
        if let Some(tx) = &self.progress {
            tx.send_replace(RetryProgress { attempt, retry_count: attempt.saturating_sub(1), phase });
        }
    }

    async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => pending().await,
        }
    }
}

/// Runs async operations with bounded retries and exponential backoff.
///
/// The engine holds only configuration; all retry state lives in the call, so one engine
/// can serve concurrent calls from many tasks.
#[derive(Debug, Clone, Default)]
pub struct RetryEngine {
    policy: RetryPolicy,
    network: Option<NetworkMonitor>,
}

impl RetryEngine {
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy, network: None }
    }

    /// Consults `monitor` when the policy requires the network to be online.
    #[must_use]
    pub fn with_network(mut self, monitor: NetworkMonitor) -> Self {
        self.network = Some(monitor);
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn network(&self) -> Option<&NetworkMonitor> {
        self.network.as_ref()
    }

    /// Runs `operation` with default hooks.
    ///
    /// # Errors
    /// See [`RetryEngine::run_with`].
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.run_with(RetryHooks::default(), operation).await
    }

    /// Runs `operation`: the first attempt immediately, then after each failure waits
    /// `policy.delay_for(n)` and tries again while `n <= max_retries` and the retry
    /// condition accepts the error.
    ///
    /// # Errors
    /// - [`RetryError::Operation`] with the last operation error once retries are exhausted
    ///   or the retry condition rejects it.
    /// - [`RetryError::TimedOut`] when the last attempt exceeded the per-attempt timeout.
    /// - [`RetryError::Offline`] when the policy requires the network and it is, or goes,
    ///   offline before the call completes.
    /// - [`RetryError::Cancelled`] when the hooks' cancellation token fires.
    pub async fn run_with<T, E, F, Fut>(
        &self,
        hooks: RetryHooks<E>,
        mut operation: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_retries = self.policy.max_retries;
        let mut attempt: u32 = 0;

        if self.policy.require_online && self.network.is_none() {
            warn!("Policy requires the network but no monitor is attached, offline checks skipped");
        }

        loop {
            if hooks.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                hooks.publish(attempt, RetryPhase::Cancelled);
                return Err(RetryError::Cancelled { attempts: attempt });
            }
            if self.offline_gate_closed() {
                warn!(attempts = attempt, "Network offline, not starting attempt");
                hooks.publish(attempt, RetryPhase::Offline);
                return Err(RetryError::Offline { attempts: attempt });
            }

            attempt += 1;
            hooks.publish(attempt, RetryPhase::Running);
            debug!(attempt, max_retries, "Starting attempt");

            let outcome = tokio::select! {
                biased;
                () = hooks.cancelled() => {
                    debug!(attempt, "Attempt cancelled");
                    hooks.publish(attempt, RetryPhase::Cancelled);
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
                () = self.went_offline() => {
                    warn!(attempt, "Network went offline during attempt");
                    hooks.publish(attempt, RetryPhase::Offline);
                    return Err(RetryError::Offline { attempts: attempt });
                }
                outcome = self.attempt(&mut operation, attempt) => outcome,
            };

            let failure = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        info!(attempt, "Operation succeeded after retry");
                    }
                    hooks.publish(attempt, RetryPhase::Succeeded);
                    return Ok(value);
                },
                Err(failure) => failure,
            };

            if !hooks.should_retry(&failure) {
                debug!(attempt, err = %failure, "Error is not retryable");
                hooks.publish(attempt, RetryPhase::Failed);
                return Err(failure);
            }

            if attempt > max_retries {
                warn!(attempts = attempt, max_retries, err = %failure, "All retries exhausted");
                if let Some(callback) = &hooks.on_exhausted {
                    callback(&failure);
                }
                hooks.publish(attempt, RetryPhase::Exhausted);
                return Err(failure);
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                attempt,
                max_retries,
                backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                err = %failure,
                "Retryable error, will retry"
            );
            if let Some(callback) = &hooks.on_retry {
                callback(attempt, delay, &failure);
            }
            hooks.publish(attempt, RetryPhase::Waiting { delay });

            tokio::select! {
                biased;
                () = hooks.cancelled() => {
                    debug!(attempt, "Backoff cancelled");
                    hooks.publish(attempt, RetryPhase::Cancelled);
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
                () = self.went_offline() => {
                    warn!(attempt, "Network went offline during backoff");
                    hooks.publish(attempt, RetryPhase::Offline);
                    return Err(RetryError::Offline { attempts: attempt });
                }
                () = sleep(delay) => {}
            }
        }
    }

    async fn attempt<T, E, F, Fut>(
        &self,
        operation: &mut F,
        attempt: u32,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let future = operation();
        match self.policy.timeout {
            Some(limit) => match timeout(limit, future).await {
                Ok(result) => {
                    result.map_err(|source| RetryError::Operation { source, attempts: attempt })
                },
                Err(_) => {
                    warn!(
                        attempt,
                        timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                        "Attempt timed out"
                    );
                    Err(RetryError::TimedOut { timeout: limit, attempts: attempt })
                },
            },
            None => {
                future.await.map_err(|source| RetryError::Operation { source, attempts: attempt })
            },
        }
    }

    fn offline_gate_closed(&self) -> bool {
        self.policy.require_online && self.network.as_ref().is_some_and(|n| !n.is_online())
    }

    /// Resolves when the gate closes; never resolves if the gate is not in use.
    async fn went_offline(&self) {
        match &self.network {
            Some(monitor) if self.policy.require_online => monitor.wait_offline().await,
            _ => pending().await,
        }
    }
}
