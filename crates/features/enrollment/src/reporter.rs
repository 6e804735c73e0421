use crate::classifier::classify;
use crate::error::FlowError;
use crate::failure::{Failure, NetworkFailure};
use std::future::Future;
use stride_domain::{EnrollmentError, ErrorCode, ErrorLogEntry};
use stride_journal::ErrorJournal;
use stride_resilience::{RetryEngine, RetryError, RetryHooks};
use tracing::{debug, instrument};

/// Classifies failures at the point of catch and journals them under the wizard step
/// that produced them.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    journal: ErrorJournal,
}

impl ErrorReporter {
    pub const fn new(journal: ErrorJournal) -> Self {
        Self { journal }
    }

    pub const fn journal(&self) -> &ErrorJournal {
        &self.journal
    }

    /// Classifies `failure` and records it for `step`.
    pub fn report(&self, failure: &Failure, step: &str) -> EnrollmentError {
        let error = classify(failure);
        self.journal.record(error.clone(), step);
        error
    }

    /// Records an already classified error.
    pub fn record(&self, error: EnrollmentError, step: &str) -> ErrorLogEntry {
        self.journal.record(error, step)
    }

    /// Runs one enrollment step through `engine`.
    ///
    /// Each failed attempt is classified and retried only while the classified error is
    /// retryable; timeouts classify as `CONNECTION_TIMEOUT` and are retried too. Every caught
    /// failure is journaled: retried ones with their `attempt` number, the final one with the
    /// total `attempts`. Cancellation is not journaled. The journal is flushed before
    /// returning an error.
    ///
    /// Any `retry_if` set on `hooks` is replaced by the retryable flag; `on_retry`
    /// callbacks still run.
    ///
    /// # Errors
    /// - [`FlowError::Step`] with the classified final error.
    /// - [`FlowError::Cancelled`] when the hooks' cancellation token fired.
    #[instrument(name = "enrollment_step", skip_all, fields(step = %step))]
    pub async fn run_step<T, F, Fut>(
        &self,
        engine: &RetryEngine,
        step: &str,
        hooks: RetryHooks<EnrollmentError>,
        mut operation: F,
    ) -> Result<T, FlowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Failure>>,
    {
        let journal = self.journal.clone();
        let retried_step = step.to_owned();
        let hooks = hooks
            .retry_if(|failure| step_error(failure).is_some_and(|error| error.retryable))
            .on_retry(move |attempt, _delay, failure| {
                if let Some(error) = step_error(failure) {
                    journal.record(error.with_context("attempt", attempt), retried_step.as_str());
                }
            });
        let classified = move || {
            let attempt = operation();
            async move { attempt.await.map_err(|failure| classify(&failure)) }
        };

        let failure = match engine.run_with(hooks, classified).await {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };

        let attempts = failure.attempts();
        let Some(error) = step_error(&failure) else {
            debug!(attempts, "Step cancelled");
            return Err(FlowError::Cancelled {
                message: format!("{step} cancelled after {attempts} attempt(s)").into(),
                context: None,
            });
        };

        let error = error.with_context("attempts", attempts);
        self.journal.record(error.clone(), step);
        self.journal.flush().await;
        Err(FlowError::Step { source: error, context: Some(format!("step '{step}'").into()) })
    }
}

/// Classified error for a failed engine call; `None` for cancellation.
fn step_error(failure: &RetryError<EnrollmentError>) -> Option<EnrollmentError> {
    match failure {
        RetryError::Operation { source, .. } => Some(source.clone()),
        RetryError::TimedOut { timeout, .. } => Some(EnrollmentError::new(
            ErrorCode::ConnectionTimeout,
            format!("Attempt timed out after {}ms", timeout.as_millis()),
        )),
        RetryError::Offline { .. } => {
            Some(classify(&Failure::network(NetworkFailure::Offline, "Network offline")))
        },
        RetryError::Cancelled { .. } => None,
    }
}
