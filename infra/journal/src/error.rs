use std::borrow::Cow;

/// A specialized [`JournalError`] enum of this crate.
#[stride_derive::stride_error]
pub enum JournalError {
    #[error("Journal I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Journal serialization failure{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Journal entry not found{}: {message}", format_context(.context))]
    EntryNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal journal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
