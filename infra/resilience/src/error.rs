use std::time::Duration;

/// Final outcome of a failed [`crate::RetryEngine`] call.
///
/// `attempts` counts operation invocations that were started, including the last one.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("Operation failed after {attempts} attempt(s): {source}")]
    Operation { source: E, attempts: u32 },

    #[error("Attempt {attempts} timed out after {timeout:?}")]
    TimedOut { timeout: Duration, attempts: u32 },

    #[error("Network went offline after {attempts} attempt(s)")]
    Offline { attempts: u32 },

    #[error("Retry cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Operation { attempts, .. }
            | Self::TimedOut { attempts, .. }
            | Self::Offline { attempts }
            | Self::Cancelled { attempts } => *attempts,
        }
    }

    /// The error returned by the last attempt, if the call ended on one.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Operation { source, .. } => Some(source),
            _ => None,
        }
    }

    #[must_use]
    pub const fn source_ref(&self) -> Option<&E> {
        match self {
            Self::Operation { source, .. } => Some(source),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_offline(&self) -> bool {
        matches!(self, Self::Offline { .. })
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Stable variant label for structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Operation { .. } => "Operation",
            Self::TimedOut { .. } => "TimedOut",
            Self::Offline { .. } => "Offline",
            Self::Cancelled { .. } => "Cancelled",
        }
    }
}
