//! Framework-independent model of the user-visible error panel.
//!
//! UI bindings feed it errors, retry progress and network transitions, then render
//! whatever [`ErrorPanel::view`] returns.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use stride_domain::{EnrollmentError, ErrorCategory, ErrorCode};
use stride_resilience::{CancellationToken, NetworkMonitor, RetryPhase, RetryProgress};
use tracing::debug;

pub const EXHAUSTED_MESSAGE: &str = "Maximum attempts reached. Please contact support.";

/// Panel shared between the UI and [`follow_network`].
pub type SharedPanel = Arc<Mutex<ErrorPanel>>;

/// Category-specific panel heading.
#[must_use]
pub const fn title_for(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Network => "Connection Problem",
        ErrorCategory::Payment => "Payment Issue",
        ErrorCategory::Auth => "Verification Failed",
        ErrorCategory::Validation => "Please Check Your Details",
        ErrorCategory::System => "Something Went Wrong",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    Hidden,
    /// Showing an error; the retry affordance depends on the error.
    Error,
    /// Retries are used up; the user is pointed to support.
    Exhausted,
    /// Connectivity lost. Clears itself once the network is back.
    NoConnection,
}

/// Render-ready snapshot of a visible panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub state: PanelState,
    pub title: &'static str,
    pub message: String,
    pub code: ErrorCode,
    /// Whether a "Try Again" action is offered.
    pub can_retry: bool,
    /// e.g. `"Retry attempt 2 of 3"`, once at least one retry happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_indicator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhausted_message: Option<&'static str>,
    pub dismissible: bool,
}

#[derive(Debug, Clone)]
pub struct ErrorPanel {
    error: Option<EnrollmentError>,
    state: PanelState,
    retry_count: u32,
    max_retries: u32,
}

impl ErrorPanel {
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { error: None, state: PanelState::Hidden, retry_count: 0, max_retries }
    }

    #[must_use]
    pub fn shared(max_retries: u32) -> SharedPanel {
        Arc::new(Mutex::new(Self::new(max_retries)))
    }

    #[must_use]
    pub const fn state(&self) -> PanelState {
        self.state
    }

    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    #[must_use]
    pub const fn error(&self) -> Option<&EnrollmentError> {
        self.error.as_ref()
    }

    /// Displays `error`, keeping the retry count of the current step.
    pub fn show(&mut self, error: EnrollmentError) {
        self.state = if error.is_offline() {
            PanelState::NoConnection
        } else if self.retry_count >= self.max_retries && error.retryable {
            PanelState::Exhausted
        } else {
            PanelState::Error
        };
        debug!(code = %error.code, state = ?self.state, "Error panel shown");
        self.error = Some(error);
    }

    /// Counts a manual "Try Again".
    pub fn record_retry(&mut self) {
        self.retry_count = self.retry_count.saturating_add(1);
        self.refresh_exhausted();
    }

    /// Mirrors the engine's progress for the running step.
    pub fn apply_progress(&mut self, progress: &RetryProgress) {
        self.retry_count = progress.retry_count;
        match progress.phase {
            RetryPhase::Succeeded => self.dismiss(),
            RetryPhase::Exhausted => {
                if self.error.is_some() {
                    self.state = PanelState::Exhausted;
                }
            },
            _ => self.refresh_exhausted(),
        }
    }

    /// Reacts to a network transition: going offline shows the no-connection state unless a
    /// non-network error is on screen; coming back online clears it.
    pub fn network_changed(&mut self, online: bool) {
        if online {
            if self.state == PanelState::NoConnection {
                debug!("Network restored, clearing no-connection panel");
                self.dismiss();
            }
            return;
        }

        let visible = self.state != PanelState::Hidden;
        let showing_other =
            visible && self.error.as_ref().is_some_and(|e| e.category != ErrorCategory::Network);
        if !showing_other {
            self.show(EnrollmentError::new(ErrorCode::Offline, "Network offline"));
        }
    }

    /// Hides the panel and resets the retry count.
    pub fn dismiss(&mut self) {
        self.error = None;
        self.state = PanelState::Hidden;
        self.retry_count = 0;
    }

    #[must_use]
    pub fn view(&self) -> Option<PanelView> {
        let error = self.error.as_ref().filter(|_| self.state != PanelState::Hidden)?;
        let exhausted = self.state == PanelState::Exhausted;

        Some(PanelView {
            state: self.state,
            title: title_for(error.category),
            message: error.user_message.clone(),
            code: error.code,
            can_retry: error.retryable && !exhausted,
            retry_indicator: (self.retry_count > 0)
                .then(|| format!("Retry attempt {} of {}", self.retry_count, self.max_retries)),
            exhausted_message: exhausted.then_some(EXHAUSTED_MESSAGE),
            dismissible: true,
        })
    }

    fn refresh_exhausted(&mut self) {
        let retryable = self.error.as_ref().is_some_and(|e| e.retryable);
        if self.state == PanelState::Error && retryable && self.retry_count >= self.max_retries {
            self.state = PanelState::Exhausted;
        }
    }
}

/// Keeps `panel` in sync with `monitor` until `cancel` fires.
pub async fn follow_network(
    panel: SharedPanel,
    monitor: NetworkMonitor,
    cancel: CancellationToken,
) {
    let mut rx = monitor.subscribe();
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let online = rx.borrow_and_update().online;
                panel.lock().network_changed(online);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_retryable_error_has_no_retry_affordance() {
        let mut panel = ErrorPanel::new(3);
        panel.show(EnrollmentError::new(ErrorCode::InvalidPhoneNumber, "auth/invalid-phone-number"));

        let view = panel.view().unwrap();
        assert_eq!(view.title, "Verification Failed");
        assert!(!view.can_retry);
        assert_eq!(view.retry_indicator, None);
        assert_eq!(view.message, ErrorCode::InvalidPhoneNumber.user_message());
    }

    #[test]
    fn retries_show_indicator_then_exhaust() {
        let mut panel = ErrorPanel::new(2);
        panel.show(EnrollmentError::new(ErrorCode::PaymentFailed, "declined by bank"));
        assert!(panel.view().unwrap().can_retry);

        panel.record_retry();
        let view = panel.view().unwrap();
        assert_eq!(view.state, PanelState::Error);
        assert_eq!(view.retry_indicator.as_deref(), Some("Retry attempt 1 of 2"));

        panel.record_retry();
        let view = panel.view().unwrap();
        assert_eq!(view.state, PanelState::Exhausted);
        assert!(!view.can_retry);
        assert_eq!(view.exhausted_message, Some(EXHAUSTED_MESSAGE));
        assert_eq!(view.title, "Payment Issue");
    }

    #[test]
    fn progress_drives_retry_count_and_success_dismisses() {
        let mut panel = ErrorPanel::new(3);
        panel.show(EnrollmentError::new(ErrorCode::ServerError, "500"));
        panel.apply_progress(&RetryProgress {
            attempt: 2,
            retry_count: 1,
            phase: RetryPhase::Running,
        });
        assert_eq!(panel.retry_count(), 1);

        panel.apply_progress(&RetryProgress {
            attempt: 2,
            retry_count: 1,
            phase: RetryPhase::Succeeded,
        });
        assert!(panel.view().is_none());
        assert_eq!(panel.retry_count(), 0);
    }

    #[test]
    fn offline_does_not_hide_payment_error() {
        let mut panel = ErrorPanel::new(3);
        panel.show(EnrollmentError::new(ErrorCode::CardDeclined, "declined"));
        panel.network_changed(false);
        assert_eq!(panel.state(), PanelState::Error);
        panel.network_changed(true);
        assert_eq!(panel.state(), PanelState::Error);
    }

    #[test]
    fn offline_then_online_round_trip() {
        let mut panel = ErrorPanel::new(3);
        panel.network_changed(false);
        let view = panel.view().unwrap();
        assert_eq!(view.state, PanelState::NoConnection);
        assert_eq!(view.title, "Connection Problem");
        assert!(!view.can_retry);

        panel.network_changed(true);
        assert!(panel.view().is_none());
    }
}
