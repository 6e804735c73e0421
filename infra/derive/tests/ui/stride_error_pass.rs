use std::borrow::Cow;
use stride_derive::stride_error;

#[stride_error]
pub enum SinkError {
    #[error("Sink I/O failure{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal sink error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read(path: &str) -> Result<String, SinkError> {
    std::fs::read_to_string(path).context("reading persisted entries")
}

fn main() {
    let _ = read("missing.json");
    let err: SinkError = "boom".into();
    assert_eq!(err.kind(), "Internal");
}
