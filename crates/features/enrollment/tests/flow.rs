use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use stride_domain::{ErrorCategory, ErrorCode};
use stride_enrollment::panel::EXHAUSTED_MESSAGE;
use stride_enrollment::{
    ErrorPanel, ErrorReporter, Failure, FlowError, NetworkFailure, PanelState, PaymentOutcome,
    follow_network,
};
use stride_journal::ErrorJournal;
use stride_resilience::{
    CancellationToken, NetworkMonitor, RetryEngine, RetryHooks, RetryPolicy, RetryProgress,
};
use tokio::time::sleep;

fn reporter() -> ErrorReporter {
    ErrorReporter::new(ErrorJournal::in_memory())
}

#[tokio::test(start_paused = true)]
async fn every_caught_failure_is_journaled_with_its_attempt() {
    let reporter = reporter();
    let engine = RetryEngine::new(RetryPolicy::default().with_max_retries(2));
    let calls = Arc::new(AtomicU32::new(0));

    let result = reporter
        .run_step(&engine, "payment", RetryHooks::new(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Failure::http(503, "gateway maintenance")) }
        })
        .await;

    let err = result.unwrap_err();
    let error = err.enrollment_error().expect("classified error");
    assert_eq!(error.code, ErrorCode::ServiceUnavailable);
    assert_eq!(error.context.get("attempts"), Some(&serde_json::json!(3)));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let entries = reporter.journal().entries();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.step == "payment"));
    assert!(entries.iter().all(|e| e.error.code == ErrorCode::ServiceUnavailable));
    assert_eq!(entries[0].error.context.get("attempt"), Some(&serde_json::json!(1)));
    assert_eq!(entries[1].error.context.get("attempt"), Some(&serde_json::json!(2)));
    assert_eq!(&entries[2].error, error);
}

#[tokio::test(start_paused = true)]
async fn timed_out_attempts_are_retried_and_journaled() {
    let reporter = reporter();
    let policy =
        RetryPolicy::default().with_max_retries(1).with_timeout(Some(Duration::from_secs(5)));
    let engine = RetryEngine::new(policy);
    let calls = Arc::new(AtomicU32::new(0));

    let value = reporter
        .run_step(&engine, "otp", RetryHooks::new(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    sleep(Duration::from_secs(60)).await;
                }
                Ok::<_, Failure>("sent")
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "sent");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let entries = reporter.journal().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].error.code, ErrorCode::ConnectionTimeout);
    assert_eq!(entries[0].error.context.get("attempt"), Some(&serde_json::json!(1)));
}

#[tokio::test(start_paused = true)]
async fn terminal_failures_are_not_retried() {
    let reporter = reporter();
    let engine = RetryEngine::new(RetryPolicy::default());
    let calls = Arc::new(AtomicU32::new(0));

    let err = reporter
        .run_step(&engine, "otp", RetryHooks::new(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Failure::auth("auth/invalid-verification-code", "wrong code")) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.enrollment_error().map(|e| e.code), Some(ErrorCode::InvalidOtp));
    assert_eq!(err.kind(), "Step");
}

#[tokio::test(start_paused = true)]
async fn success_after_transient_failure_keeps_only_the_retried_failure() {
    let reporter = reporter();
    let engine = RetryEngine::new(RetryPolicy::default());
    let calls = Arc::new(AtomicU32::new(0));

    let value = reporter
        .run_step(&engine, "details", RetryHooks::new(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(Failure::network(NetworkFailure::Connection, "reset"))
                } else {
                    Ok("enrollment_123")
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "enrollment_123");
    let entries = reporter.journal().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].error.code, ErrorCode::NetworkError);
}

#[tokio::test(start_paused = true)]
async fn timed_out_step_is_reported_as_connection_timeout() {
    let reporter = reporter();
    let policy =
        RetryPolicy::default().with_max_retries(0).with_timeout(Some(Duration::from_secs(5)));
    let engine = RetryEngine::new(policy);

    let err = reporter
        .run_step(&engine, "review", RetryHooks::new(), || async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, Failure>(())
        })
        .await
        .unwrap_err();

    let error = err.enrollment_error().unwrap();
    assert_eq!(error.code, ErrorCode::ConnectionTimeout);
    assert_eq!(error.category, ErrorCategory::Network);
}

#[tokio::test(start_paused = true)]
async fn cancelled_step_is_not_journaled() {
    let reporter = reporter();
    let engine = RetryEngine::new(RetryPolicy::default());
    let token = CancellationToken::new();
    token.cancel();

    let err = reporter
        .run_step(&engine, "batch", RetryHooks::new().cancel_on(token), || async {
            Ok::<_, Failure>(())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Cancelled { .. }));
    assert!(reporter.journal().is_empty());
}

#[tokio::test(start_paused = true)]
async fn panel_follows_engine_progress_to_exhaustion() {
    let reporter = reporter();
    let engine = RetryEngine::new(RetryPolicy::default().with_max_retries(2));
    let panel = ErrorPanel::shared(engine.policy().max_retries);
    let (tx, rx) = RetryProgress::channel();

    let err = reporter
        .run_step(&engine, "payment", RetryHooks::new().progress(tx), || async {
            Err::<(), _>(Failure::payment(PaymentOutcome::Failed, "declined"))
        })
        .await
        .unwrap_err();

    let mut guard = panel.lock();
    guard.show(err.enrollment_error().unwrap().clone());
    guard.apply_progress(&rx.borrow());

    let view = guard.view().unwrap();
    assert_eq!(view.state, PanelState::Exhausted);
    assert_eq!(view.retry_indicator.as_deref(), Some("Retry attempt 2 of 2"));
    assert_eq!(view.exhausted_message, Some(EXHAUSTED_MESSAGE));
    assert!(!view.can_retry);
}

#[tokio::test(start_paused = true)]
async fn going_offline_shows_no_connection_until_network_returns() {
    let reporter = reporter();
    let monitor = NetworkMonitor::new(true);
    let engine = RetryEngine::new(RetryPolicy::default().require_online(true))
        .with_network(monitor.clone());
    let panel = ErrorPanel::shared(engine.policy().max_retries);
    let cancel = CancellationToken::new();
    let follower =
        tokio::spawn(follow_network(Arc::clone(&panel), monitor.clone(), cancel.clone()));

    tokio::spawn({
        let monitor = monitor.clone();
        async move {
            sleep(Duration::from_millis(250)).await;
            monitor.set_offline();
        }
    });

    let err = reporter
        .run_step(&engine, "payment", RetryHooks::new(), || async {
            sleep(Duration::from_secs(20)).await;
            Ok::<_, Failure>("paid")
        })
        .await
        .unwrap_err();

    let error = err.enrollment_error().unwrap().clone();
    assert_eq!(error.code, ErrorCode::Offline);
    assert!(!error.retryable);
    assert_eq!(reporter.journal().by_category(ErrorCategory::Network).len(), 1);

    panel.lock().show(error);
    let view = panel.lock().view().unwrap();
    assert_eq!(view.state, PanelState::NoConnection);
    assert!(!view.can_retry);

    monitor.set_online();
    sleep(Duration::from_millis(1)).await;
    assert!(panel.lock().view().is_none(), "coming back online clears the panel");

    cancel.cancel();
    follower.await.unwrap();
}
