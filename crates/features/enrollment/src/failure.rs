//! Boundary adapters: every collaborator failure is normalized into a [`Failure`] before it
//! reaches the classifier.

use crate::error::{FlowError, FlowErrorExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io;
use stride_domain::constants::AUTH_CODE_PREFIX;

const NETWORK_NAMES: &[&str] = &["NetworkError", "FetchError"];
const TIMEOUT_NAMES: &[&str] = &["TimeoutError", "AbortError"];
const NETWORK_CODES: &[&str] = &[
    "NETWORK_ERROR",
    "ECONNREFUSED",
    "ECONNRESET",
    "ENOTFOUND",
    "EAI_AGAIN",
    "EPIPE",
    // Phone-auth SDK reports lost connectivity under its `auth/` namespace.
    "auth/network-request-failed",
];
const TIMEOUT_CODES: &[&str] = &["ETIMEDOUT", "ECONNABORTED", "TIMEOUT", "CONNECTION_TIMEOUT"];
const OFFLINE_CODES: &[&str] = &["OFFLINE", "ERR_INTERNET_DISCONNECTED"];
const PAYMENT_MARKERS: &[&str] = &["razorpay_error", "payment_error", "payment"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkFailure {
    Timeout,
    Offline,
    Connection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Failed,
    Cancelled,
    Other,
}

/// A collaborator failure in normalized, tagged form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Failure {
    Network { kind: NetworkFailure, message: String },
    /// OTP provider failure carrying its vendor code (e.g. `auth/invalid-phone-number`).
    Auth { code: String, message: String },
    Payment {
        outcome: PaymentOutcome,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Http { status: u16, message: String },
    Validation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        message: String,
    },
    Other {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        message: String,
    },
}

impl Failure {
    pub fn network(kind: NetworkFailure, message: impl Into<String>) -> Self {
        Self::Network { kind, message: message.into() }
    }

    pub fn auth(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth { code: code.into(), message: message.into() }
    }

    pub fn payment(outcome: PaymentOutcome, message: impl Into<String>) -> Self {
        Self::Payment { outcome, message: message.into(), reason: None }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    pub fn validation(field: Option<&str>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.map(str::to_owned), message: message.into() }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other { name: None, message: message.into() }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. }
            | Self::Auth { message, .. }
            | Self::Payment { message, .. }
            | Self::Http { message, .. }
            | Self::Validation { message, .. }
            | Self::Other { message, .. } => message,
        }
    }

    /// Normalizes a loosely shaped error object as thrown by web collaborators.
    ///
    /// Fields are checked in a fixed order, first match wins: network name/code, auth
    /// vendor code, payment marker, numeric HTTP status, validation field. Anything else
    /// (including non-object values) becomes [`Failure::Other`].
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            let message = value.as_str().map_or_else(|| value.to_string(), str::to_owned);
            return Self::Other { name: None, message };
        };

        let text = |key: &str| object.get(key).and_then(Value::as_str);
        let name = text("name");
        let code = text("code");
        let message = text("message").unwrap_or_default().to_owned();

        if let Some(kind) = network_kind(name, code) {
            return Self::Network { kind, message };
        }

        if let Some(code) = code.filter(|c| c.starts_with(AUTH_CODE_PREFIX)) {
            return Self::Auth { code: code.to_owned(), message };
        }

        if let Some(marker) = PAYMENT_MARKERS.iter().find_map(|key| object.get(*key)) {
            return payment_from_marker(marker, code, message);
        }

        let status = ["status", "statusCode"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_u64))
            .and_then(|s| u16::try_from(s).ok());
        if let Some(status) = status {
            return Self::Http { status, message };
        }

        if let Some(field) = text("field") {
            return Self::Validation { field: Some(field.to_owned()), message };
        }

        Self::Other { name: name.map(str::to_owned), message }
    }

    /// Parses JSON text and normalizes it with [`Failure::from_value`].
    ///
    /// # Errors
    /// Returns [`FlowError::Payload`] when `raw` is not valid JSON.
    pub fn from_json(raw: &str) -> Result<Self, FlowError> {
        let value: Value = serde_json::from_str(raw).context("Failure payload is not JSON")?;
        Ok(Self::from_value(&value))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { kind, message } => write!(f, "network ({kind:?}): {message}"),
            Self::Auth { code, message } => write!(f, "{code}: {message}"),
            Self::Payment { outcome, message, .. } => write!(f, "payment ({outcome:?}): {message}"),
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Validation { field: Some(field), message } => write!(f, "{field}: {message}"),
            Self::Validation { field: None, message } | Self::Other { name: None, message } => {
                f.write_str(message)
            },
            Self::Other { name: Some(name), message } => write!(f, "{name}: {message}"),
        }
    }
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Some(NetworkFailure::Timeout),
            io::ErrorKind::NetworkDown | io::ErrorKind::NetworkUnreachable => {
                Some(NetworkFailure::Offline)
            },
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::UnexpectedEof => Some(NetworkFailure::Connection),
            _ => None,
        };

        match kind {
            Some(kind) => Self::Network { kind, message: err.to_string() },
            None => Self::Other { name: Some(format!("{:?}", err.kind())), message: err.to_string() },
        }
    }
}

fn network_kind(name: Option<&str>, code: Option<&str>) -> Option<NetworkFailure> {
    let named = |set: &[&str]| name.is_some_and(|n| set.contains(&n));
    let coded = |set: &[&str]| code.is_some_and(|c| set.iter().any(|s| s.eq_ignore_ascii_case(c)));

    if named(TIMEOUT_NAMES) || coded(TIMEOUT_CODES) {
        Some(NetworkFailure::Timeout)
    } else if coded(OFFLINE_CODES) {
        Some(NetworkFailure::Offline)
    } else if named(NETWORK_NAMES) || coded(NETWORK_CODES) {
        Some(NetworkFailure::Connection)
    } else {
        None
    }
}

fn payment_from_marker(marker: &Value, code: Option<&str>, message: String) -> Failure {
    let field = |key: &str| marker.get(key).and_then(Value::as_str);
    let reason = field("reason").or_else(|| field("description")).map(str::to_owned);
    let signal = [field("status"), field("code"), code, marker.as_str()]
        .into_iter()
        .flatten()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>();

    let outcome = if signal.iter().any(|s| s.contains("cancel") || s.contains("dismiss")) {
        PaymentOutcome::Cancelled
    } else if signal.iter().any(|s| s.contains("fail") || s.contains("declin")) {
        PaymentOutcome::Failed
    } else {
        PaymentOutcome::Other
    };

    let message = if message.is_empty() {
        field("description").unwrap_or_default().to_owned()
    } else {
        message
    };

    Failure::Payment { outcome, message, reason }
}
