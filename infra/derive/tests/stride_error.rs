use std::borrow::Cow;
use stride_derive::stride_error;

#[stride_error]
pub enum ProbeError {
    #[error("Probe I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Probe rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal sample error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn failing_io() -> Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline elapsed"))
}

#[test]
fn ui_pass_cases_compile() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/stride_error_pass.rs");
}

#[test]
fn context_is_attached_to_upstream_errors() {
    let err = failing_io().context("persisting journal").unwrap_err();
    assert_eq!(err.kind(), "Io");
    assert_eq!(err.to_string(), "Probe I/O failure (persisting journal): deadline elapsed");
}

#[test]
fn question_mark_converts_sources_without_context() {
    fn run() -> Result<(), ProbeError> {
        failing_io()?;
        Ok(())
    }

    let err = run().unwrap_err();
    assert!(matches!(err, ProbeError::Io { context: None, .. }));
    assert_eq!(err.to_string(), "Probe I/O failure: deadline elapsed");
}

#[test]
fn context_overrides_on_own_results() {
    let res: Result<(), ProbeError> =
        Err(ProbeError::Rejected { message: "bad input".into(), context: None });
    let err = res.context("validating step").unwrap_err();
    assert_eq!(err.to_string(), "Probe rejected (validating step): bad input");
    assert_eq!(err.kind(), "Rejected");
}

#[test]
fn strings_fall_back_to_internal() {
    let borrowed: ProbeError = "static failure".into();
    let owned: ProbeError = String::from("owned failure").into();
    assert!(matches!(borrowed, ProbeError::Internal { .. }));
    assert_eq!(owned.to_string(), "Internal sample error: owned failure");
}
