//! # Enrollment Failure Handling
//!
//! The enrollment wizard's error surface, independent of any UI framework:
//!
//! 1. **Adapters ([`failure`])**: collaborator failures (OTP provider, payment gateway,
//!    backend HTTP, browser network) are normalized into a tagged [`Failure`].
//! 2. **Classification ([`classifier`])**: a [`Failure`] maps onto the fixed taxonomy as an
//!    [`EnrollmentError`] with its registered user message and retryable flag.
//! 3. **Reporting ([`ErrorReporter`])**: classification plus journaling, and retried step
//!    execution through the resilience engine.
//! 4. **Presentation ([`panel`])**: the error panel model, including the retry indicator,
//!    the exhausted state and the self-clearing no-connection state.
//!
//! ## Example
//!
//! ```rust
//! use stride_enrollment::{ErrorReporter, Failure};
//! use stride_domain::{ErrorCategory, ErrorCode};
//! use stride_journal::ErrorJournal;
//!
//! let reporter = ErrorReporter::new(ErrorJournal::in_memory());
//! let error = reporter.report(&Failure::auth("auth/invalid-phone-number", "TOO_SHORT"), "otp");
//!
//! assert_eq!(error.code, ErrorCode::InvalidPhoneNumber);
//! assert_eq!(error.category, ErrorCategory::Auth);
//! assert!(!error.retryable);
//! assert_eq!(reporter.journal().len(), 1);
//! ```

pub mod classifier;
mod error;
pub mod failure;
pub mod panel;
mod reporter;

pub use crate::classifier::{classify, classify_value};
pub use crate::error::{FlowError, FlowErrorExt};
pub use crate::failure::{Failure, NetworkFailure, PaymentOutcome};
pub use crate::panel::{ErrorPanel, PanelState, PanelView, follow_network};
pub use crate::reporter::ErrorReporter;
pub use stride_domain::EnrollmentError;
