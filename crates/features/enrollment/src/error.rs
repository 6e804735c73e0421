use std::borrow::Cow;
use stride_domain::EnrollmentError;

/// Error types specific to the enrollment feature.
#[stride_derive::stride_error]
pub enum FlowError {
    /// A step failed for good; the classified error has already been journaled.
    #[error("Enrollment step failed{}: {source}", format_context(.context))]
    Step { source: EnrollmentError, context: Option<Cow<'static, str>> },

    /// The caller abandoned the step before it finished.
    #[error("Enrollment step cancelled{}: {message}", format_context(.context))]
    Cancelled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Malformed failure payload{}: {source}", format_context(.context))]
    Payload { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal enrollment error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl FlowError {
    /// The classified error behind a failed step.
    #[must_use]
    pub const fn enrollment_error(&self) -> Option<&EnrollmentError> {
        match self {
            Self::Step { source, .. } => Some(source),
            _ => None,
        }
    }
}
