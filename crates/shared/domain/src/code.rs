//! Registry of error codes.
//!
//! Every code owns exactly one category, one pre-registered user-facing message and a
//! static retryable flag. The tables below are exhaustive matches, so adding a code
//! without registering it is a compile error.

use crate::category::ErrorCategory;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Network
    NetworkError,
    ConnectionTimeout,
    Offline,

    // Payment
    PaymentFailed,
    PaymentCancelled,
    PaymentTimeout,
    PaymentGatewayError,
    PaymentVerificationFailed,
    InsufficientFunds,
    CardDeclined,
    InvalidPaymentData,

    // Auth
    InvalidPhoneNumber,
    InvalidOtp,
    OtpExpired,
    TooManyRequests,
    AuthFailed,
    SessionExpired,
    Unauthorized,

    // Validation
    InvalidInput,
    MissingRequiredField,
    InvalidEmail,
    InvalidDate,
    BatchFull,
    AlreadyEnrolled,

    // System
    DatabaseError,
    ServerError,
    ServiceUnavailable,
    UnknownError,
}

impl ErrorCode {
    /// Registry name, e.g. `"INVALID_OTP"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Iterates over every registered code.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::NetworkError | Self::ConnectionTimeout | Self::Offline => ErrorCategory::Network,
            Self::PaymentFailed
            | Self::PaymentCancelled
            | Self::PaymentTimeout
            | Self::PaymentGatewayError
            | Self::PaymentVerificationFailed
            | Self::InsufficientFunds
            | Self::CardDeclined
            | Self::InvalidPaymentData => ErrorCategory::Payment,
            Self::InvalidPhoneNumber
            | Self::InvalidOtp
            | Self::OtpExpired
            | Self::TooManyRequests
            | Self::AuthFailed
            | Self::SessionExpired
            | Self::Unauthorized => ErrorCategory::Auth,
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidEmail
            | Self::InvalidDate
            | Self::BatchFull
            | Self::AlreadyEnrolled => ErrorCategory::Validation,
            Self::DatabaseError
            | Self::ServerError
            | Self::ServiceUnavailable
            | Self::UnknownError => ErrorCategory::System,
        }
    }

    /// Whether a failure with this code may be retried, automatically or via "Try Again".
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NetworkError
                | Self::ConnectionTimeout
                | Self::PaymentFailed
                | Self::PaymentCancelled
                | Self::PaymentTimeout
                | Self::PaymentGatewayError
                | Self::OtpExpired
                | Self::TooManyRequests
                | Self::AuthFailed
                | Self::DatabaseError
                | Self::ServerError
                | Self::ServiceUnavailable
                | Self::UnknownError
        )
    }

    /// The message shown to the user for this code.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::NetworkError => {
                "Unable to connect. Please check your internet connection and try again."
            },
            Self::ConnectionTimeout => "The request took too long to respond. Please try again.",
            Self::Offline => {
                "You appear to be offline. We'll continue as soon as your connection is back."
            },
            Self::PaymentFailed => "Your payment could not be processed. Please try again.",
            Self::PaymentCancelled => {
                "Payment was cancelled. You can try again whenever you're ready."
            },
            Self::PaymentTimeout => {
                "The payment is taking longer than expected. Please try again."
            },
            Self::PaymentGatewayError => {
                "The payment service is having trouble right now. Please try again shortly."
            },
            Self::PaymentVerificationFailed => {
                "We couldn't verify your payment. If you were charged, please contact support."
            },
            Self::InsufficientFunds => {
                "Your payment was declined due to insufficient funds. Please use another payment method."
            },
            Self::CardDeclined => {
                "Your card was declined. Please use another card or payment method."
            },
            Self::InvalidPaymentData => {
                "Some payment details are invalid. Please review them and try again."
            },
            Self::InvalidPhoneNumber => "Please enter a valid 10-digit mobile number.",
            Self::InvalidOtp => "The verification code is incorrect. Please check and try again.",
            Self::OtpExpired => "The verification code has expired. Please request a new one.",
            Self::TooManyRequests => {
                "Too many attempts. Please wait a few minutes before trying again."
            },
            Self::AuthFailed => "We couldn't verify your number. Please try again.",
            Self::SessionExpired => "Your session has expired. Please log in again.",
            Self::Unauthorized => {
                "You are not allowed to perform this action. Please log in again."
            },
            Self::InvalidInput => {
                "Some of the information entered is invalid. Please review and try again."
            },
            Self::MissingRequiredField => "Please fill in all required fields.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::InvalidDate => "Please choose a valid date.",
            Self::BatchFull => "This batch is full. Please choose another batch or time slot.",
            Self::AlreadyEnrolled => "You are already enrolled in this batch.",
            Self::DatabaseError => "We couldn't save your details. Please try again.",
            Self::ServerError => "Something went wrong on our end. Please try again.",
            Self::ServiceUnavailable => {
                "The service is temporarily unavailable. Please try again in a moment."
            },
            Self::UnknownError => "An unexpected error occurred. Please try again.",
        }
    }
}
