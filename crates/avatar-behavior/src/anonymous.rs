//! A behavior backed by closures.

use std::fmt;

use avatar_core::AvatarResult;

use crate::{AvatarBehavior, GetNext, MethodInvocation, MethodReturn};

type ExecuteFn =
    dyn Fn(&MethodInvocation, GetNext<'_>) -> AvatarResult<MethodReturn> + Send + Sync;
type AppliesFn = dyn Fn(&MethodInvocation) -> bool + Send + Sync;

/// An [`AvatarBehavior`] built from a closure.
///
/// Applies to every call unless narrowed with
/// [`applies_when`][Self::applies_when].
///
/// ```rust,ignore
/// let double = AnonymousBehavior::new(|inv, _next| {
///     let n = inv.arguments().get::<i32>("n")?;
///     inv.create_return(Some((n * 2).into()))
/// })
/// .applies_when(|inv| inv.method().name() == "double")
/// .named("double");
/// ```
pub struct AnonymousBehavior {
    execute:    Box<ExecuteFn>,
    applies_to: Option<Box<AppliesFn>>,
    name:       Option<String>,
}

impl AnonymousBehavior {
    pub fn new<F>(execute: F) -> Self
    where
        F: Fn(&MethodInvocation, GetNext<'_>) -> AvatarResult<MethodReturn> + Send + Sync + 'static,
    {
        Self {
            execute:    Box::new(execute),
            applies_to: None,
            name:       None,
        }
    }

    /// Restrict the behavior to calls matching `predicate`.
    pub fn applies_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&MethodInvocation) -> bool + Send + Sync + 'static,
    {
        self.applies_to = Some(Box::new(predicate));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl AvatarBehavior for AnonymousBehavior {
    fn applies_to(&self, invocation: &MethodInvocation) -> bool {
        self.applies_to.as_ref().is_none_or(|p| p(invocation))
    }

    fn execute(&self, invocation: &MethodInvocation, next: GetNext<'_>) -> AvatarResult<MethodReturn> {
        (self.execute)(invocation, next)
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("AnonymousBehavior")
    }
}

impl fmt::Debug for AnonymousBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnonymousBehavior")
            .field("name", &self.name())
            .field("filtered", &self.applies_to.is_some())
            .finish()
    }
}
