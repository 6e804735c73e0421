#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Stride crates.
//!
//! Currently this is a single attribute, [`macro@stride_error`], that turns a plain enum into
//! the error type used across the workspace: `thiserror` display impls, a `context`
//! extension trait, upstream conversions and a `kind()` accessor for structured logs.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! stride-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context(...)`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped upstream error.
/// * **Standard Conversions**: Implements `From<Source>` for variants holding a `source` field
///   (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
/// * **Kind Accessor**: `fn kind(&self) -> &'static str` returning the variant name, used as
///   a stable `tracing` field.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with **named-field** variants only.
/// 2. Variants that carry context must use `context: Option<Cow<'static, str>>`.
/// 3. Variants wrapping an upstream error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[stride_derive::stride_error]
/// pub enum JournalError {
///     #[error("Sink I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal journal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &std::path::Path) -> Result<String, JournalError> {
///     std::fs::read_to_string(path).context("Reading persisted journal")
/// }
/// ```
#[proc_macro_attribute]
pub fn stride_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
