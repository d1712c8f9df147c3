//! Shared exception handle carried by method returns.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::AvatarError;

/// A reference-counted error value.
///
/// Cloning an `Exception` shares the same underlying error, so a behavior
/// that packages an exception into a return and the caller that receives it
/// back can compare the two with [`ptr_eq`][Self::ptr_eq].
#[derive(Clone)]
pub struct Exception(Arc<dyn Error + Send + Sync + 'static>);

impl Exception {
    pub fn new<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self(Arc::new(error))
    }

    /// An exception carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// `true` if both handles point at the same error instance.
    pub fn ptr_eq(&self, other: &Exception) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.0
    }
}

impl From<AvatarError> for Exception {
    /// Unwraps `AvatarError::Exception` rather than nesting it.
    fn from(error: AvatarError) -> Self {
        match error {
            AvatarError::Exception(e) => e,
            other => Exception::new(other),
        }
    }
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl Error for Exception {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for Message {}
