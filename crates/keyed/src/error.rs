//! # Keyed Errors
//!
//! Construction, selection and purge never fail. Errors only surface when a caller
//! tries to mutate or re-register a purged entity, when a verified `assign` sees a
//! mismatched key, or when configuration cannot be loaded.

use crate::key::Key;
use std::borrow::Cow;

/// A specialized [`KeyedError`] enum for factory and entity failures.
#[keyed_derive::keyed_error]
pub enum KeyedError {
    /// The entity was purged and its state is frozen.
    #[error("Entity '{key}' is purged and frozen{}", format_context(.context))]
    Purged { key: Key, context: Option<Cow<'static, str>> },

    /// `assign` under [`AssignPolicy::Verify`](crate::AssignPolicy::Verify) received an
    /// entity whose own key differs from the registry key.
    #[error("Key mismatch{}: expected '{expected}', entity reports '{found}'", format_context(.context))]
    KeyMismatch { expected: Key, found: Key, context: Option<Cow<'static, str>> },

    /// Failure while loading or deserializing configuration.
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal keyed error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
