//! Maps a normalized [`Failure`] onto the fixed error taxonomy.
//!
//! The classifier is pure: it never logs or records. Use [`crate::ErrorReporter`] to
//! classify and journal in one step.

use crate::failure::{Failure, NetworkFailure, PaymentOutcome};
use serde_json::Value;
use stride_domain::{EnrollmentError, ErrorCode};

/// Classifies a failure. Rules are checked in order and the first match wins.
#[must_use]
pub fn classify(failure: &Failure) -> EnrollmentError {
    match failure {
        Failure::Network { kind, message } => {
            let code = match kind {
                NetworkFailure::Timeout => ErrorCode::ConnectionTimeout,
                NetworkFailure::Offline => ErrorCode::Offline,
                NetworkFailure::Connection => ErrorCode::NetworkError,
            };
            EnrollmentError::new(code, message.clone()).with_context("networkKind", tag(kind))
        },
        Failure::Auth { code, message } => EnrollmentError::new(auth_code(code), message.clone())
            .with_context("authCode", code.clone()),
        Failure::Payment { outcome, message, reason } => {
            let code = payment_code(*outcome, reason.as_deref());
            let error = EnrollmentError::new(code, message.clone())
                .with_context("paymentOutcome", tag(outcome));
            match reason {
                Some(reason) => error.with_context("reason", reason.clone()),
                None => error,
            }
        },
        Failure::Http { status, message } => {
            EnrollmentError::new(status_code(*status), message.clone())
                .with_context("status", *status)
        },
        Failure::Validation { field, message } => {
            let lowered = message.to_ascii_lowercase();
            let code = if lowered.contains("missing") || lowered.contains("required") {
                ErrorCode::MissingRequiredField
            } else {
                ErrorCode::InvalidInput
            };
            let error = EnrollmentError::new(code, message.clone());
            match field {
                Some(field) => error.with_context("field", field.clone()),
                None => error,
            }
        },
        Failure::Other { name, message } => {
            let error = EnrollmentError::new(ErrorCode::UnknownError, message.clone());
            match name {
                Some(name) => error.with_context("name", name.clone()),
                None => error,
            }
        },
    }
}

/// Normalizes and classifies a loosely shaped error object in one go.
#[must_use]
pub fn classify_value(value: &Value) -> EnrollmentError {
    classify(&Failure::from_value(value))
}

/// Sub-mapping of OTP provider codes. Unknown codes are a generic auth failure.
#[must_use]
pub fn auth_code(vendor_code: &str) -> ErrorCode {
    match vendor_code {
        "auth/invalid-phone-number" => ErrorCode::InvalidPhoneNumber,
        "auth/invalid-verification-code" => ErrorCode::InvalidOtp,
        "auth/code-expired" => ErrorCode::OtpExpired,
        "auth/too-many-requests" => ErrorCode::TooManyRequests,
        "auth/session-expired" | "auth/user-token-expired" => ErrorCode::SessionExpired,
        "auth/unauthorized" => ErrorCode::Unauthorized,
        _ => ErrorCode::AuthFailed,
    }
}

/// HTTP status to code: client errors map to data/permission problems, server errors to
/// retryable service failures.
#[must_use]
pub const fn status_code(status: u16) -> ErrorCode {
    match status {
        408 => ErrorCode::ConnectionTimeout,
        401 | 403 => ErrorCode::Unauthorized,
        409 => ErrorCode::AlreadyEnrolled,
        429 => ErrorCode::TooManyRequests,
        400..=499 => ErrorCode::InvalidPaymentData,
        503 => ErrorCode::ServiceUnavailable,
        500..=599 => ErrorCode::ServerError,
        _ => ErrorCode::UnknownError,
    }
}

fn payment_code(outcome: PaymentOutcome, reason: Option<&str>) -> ErrorCode {
    match outcome {
        PaymentOutcome::Cancelled => ErrorCode::PaymentCancelled,
        PaymentOutcome::Other => ErrorCode::PaymentGatewayError,
        PaymentOutcome::Failed => {
            let reason = reason.map(|r| r.to_ascii_lowercase().replace(['_', '-'], " "));
            match reason.as_deref() {
                Some(r) if r.contains("insufficient") => ErrorCode::InsufficientFunds,
                Some(r) if r.contains("declined") => ErrorCode::CardDeclined,
                _ => ErrorCode::PaymentFailed,
            }
        },
    }
}

fn tag(value: &impl serde::Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
