//! `MethodReturn` — the outcome of one invocation.

use std::fmt;

use avatar_core::{ArgumentCollection, AvatarError, AvatarResult, Exception, FromValue, Value};

use crate::InvocationContext;

/// The result of a call: either a value with its `ref`/`out` outputs, or an
/// exception.
///
/// Built through [`MethodInvocation`][crate::MethodInvocation]'s
/// `create_*_return` methods so that the context is always the invocation's
/// own bag.
#[derive(Clone, Debug)]
pub struct MethodReturn {
    return_value: Option<Value>,
    outputs:      ArgumentCollection,
    exception:    Option<Exception>,
    context:      InvocationContext,
}

impl MethodReturn {
    pub(crate) fn from_value(
        return_value: Option<Value>,
        outputs:      ArgumentCollection,
        context:      InvocationContext,
    ) -> Self {
        Self { return_value, outputs, exception: None, context }
    }

    pub(crate) fn from_exception(exception: Exception, context: InvocationContext) -> Self {
        Self {
            return_value: None,
            outputs:      ArgumentCollection::empty(),
            exception:    Some(exception),
            context,
        }
    }

    /// The returned value; `None` for `void` methods and exception returns.
    #[inline]
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// Final values of the method's `ref` and `out` parameters.
    #[inline]
    pub fn outputs(&self) -> &ArgumentCollection {
        &self.outputs
    }

    #[inline]
    pub fn exception(&self) -> Option<&Exception> {
        self.exception.as_ref()
    }

    #[inline]
    pub fn is_exception(&self) -> bool {
        self.exception.is_some()
    }

    /// The originating invocation's context (shared, not copied).
    #[inline]
    pub fn context(&self) -> &InvocationContext {
        &self.context
    }

    /// The return value as `T`.
    ///
    /// An exception return yields `AvatarError::Exception`; a missing value
    /// reads as null, so `get::<()>()` succeeds for `void` methods.
    pub fn get<T: FromValue>(&self) -> AvatarResult<T> {
        if let Some(e) = &self.exception {
            return Err(AvatarError::Exception(e.clone()));
        }
        let value = self.return_value.as_ref().unwrap_or(&Value::Null);
        T::from_value(value).map_err(|e| e.into_error("return value"))
    }

    /// `Err` with the exception if there is one, otherwise `Ok(self)`.
    pub fn into_result(self) -> AvatarResult<Self> {
        match self.exception {
            Some(e) => Err(AvatarError::Exception(e)),
            None => Ok(self),
        }
    }
}

impl fmt::Display for MethodReturn {
    /// `=> true (b: "y", c: 42)`, `=> void`, or `=> !division by zero`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(e) = &self.exception {
            return write!(f, "=> !{e}");
        }
        match &self.return_value {
            Some(v) => write!(f, "=> {v}")?,
            None => f.write_str("=> void")?,
        }
        if !self.outputs.is_empty() {
            write!(f, " ({})", self.outputs)?;
        }
        Ok(())
    }
}
