//! Runtime error type.
//!
//! Every `avatar-*` crate reports failures through [`AvatarError`].  The
//! variants map one-to-one onto the failure kinds a caller can act on:
//! misuse at an API boundary (count, lookup, null, type) is raised where it
//! happens, while `NotImplemented` is the normal outcome of calling an
//! unconfigured proxy member.

use thiserror::Error;

use crate::{Exception, ValueType};

/// The error type for argument marshaling and pipeline dispatch.
#[derive(Debug, Clone, Error)]
pub enum AvatarError {
    #[error("{target} expects {expected} argument(s) but {got} were supplied")]
    ArgumentCountMismatch {
        target:   String,
        expected: usize,
        got:      usize,
    },

    #[error("argument `{name}` not found")]
    ArgumentNotFound { name: String },

    #[error("index {index} is out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("`{name}` of type {expected} cannot be null")]
    NullValue { name: String, expected: ValueType },

    #[error("`{name}` expects {expected} but got {actual}")]
    TypeMismatch {
        name:     String,
        expected: ValueType,
        actual:   String,
    },

    #[error("duplicate parameter name `{name}`")]
    DuplicateParameter { name: String },

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    /// An exception raised by a behavior or by the real implementation.
    /// Displayed as the inner error; identity is kept in the `Exception`.
    #[error(transparent)]
    Exception(Exception),
}

impl AvatarError {
    /// `true` for the "no behavior and no base implementation" outcome.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, AvatarError::NotImplemented(_))
    }

    /// The wrapped exception, if this error carries one.
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            AvatarError::Exception(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Exception> for AvatarError {
    fn from(exception: Exception) -> Self {
        AvatarError::Exception(exception)
    }
}

/// Shorthand result type for all `avatar-*` crates.
pub type AvatarResult<T> = Result<T, AvatarError>;
