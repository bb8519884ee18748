#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared by the keyed workspace.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! keyed-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! The generated code refers to `::thiserror`, so consuming crates must depend on it.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns a named-field enum into a workspace error type.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]`, unless already derived.
/// * `Result<T, E = ErrorName>` alias in the same module.
/// * `<ErrorName>Ext` trait adding `.context(...)` to `Result<T, ErrorName>` and to
///   `Result<T, Source>` for every variant wrapping a source error.
/// * `From<Source>` for variants with a `source` field (or one marked `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A private `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// Every variant uses named fields. A variant with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[keyed_derive::keyed_error]
/// pub enum StoreError {
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Settings> {
///     builder.build().context("Reading keyed.toml")?.try_deserialize().map_err(Into::into)
/// }
/// ```
#[proc_macro_attribute]
pub fn keyed_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
