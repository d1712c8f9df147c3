//! The `AvatarBehavior` trait — the main extension point for user code.

use std::fmt;
use std::sync::Arc;

use avatar_core::{AvatarResult, TypeKey};

use crate::{GetNext, MethodInvocation, MethodReturn};

/// Identifies a behavior by its concrete Rust type.
///
/// Used in an invocation's skip set: every behavior of a skipped kind is
/// bypassed for that one call.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct BehaviorKind(TypeKey);

impl BehaviorKind {
    #[inline]
    pub fn of<B: ?Sized + 'static>() -> Self {
        Self(TypeKey::of::<B>())
    }

    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.0
    }

    /// Type name without module path.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.0.short_name()
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pluggable interceptor.
///
/// A pipeline asks each behavior, in list order, whether it
/// [`applies_to`][Self::applies_to] the current call.  The first one that does
/// gets [`execute`][Self::execute]d and chooses to either:
///
/// - finish the call by returning a [`MethodReturn`] (a value, or an
///   exception built with
///   [`create_exception_return`][MethodInvocation::create_exception_return]), or
/// - continue it with `next.proceed(invocation)` and pass the result on,
///   possibly after doing work before and after.
///
/// Returning `Err` aborts the call; the error reaches the pipeline's caller
/// unchanged.
///
/// # Thread safety
///
/// A pipeline may be shared between threads, so behaviors must be
/// `Send + Sync`.  State that changes per call belongs in interior-mutable
/// fields (see [`RecordingBehavior`][crate::RecordingBehavior]).
///
/// # Example
///
/// ```rust,ignore
/// struct Logging;
///
/// impl AvatarBehavior for Logging {
///     fn applies_to(&self, _: &MethodInvocation) -> bool { true }
///
///     fn execute(&self, invocation: &MethodInvocation, next: GetNext<'_>) -> AvatarResult<MethodReturn> {
///         println!("-> {invocation}");
///         let result = next.proceed(invocation)?;
///         println!("<- {result}");
///         Ok(result)
///     }
/// }
/// ```
pub trait AvatarBehavior: Send + Sync + 'static {
    /// Whether this behavior wants to see `invocation`.
    ///
    /// Must be cheap and free of side effects: it may be evaluated several
    /// times per call while the pipeline searches for the next behavior.
    fn applies_to(&self, invocation: &MethodInvocation) -> bool;

    /// Intercept the call.
    fn execute(&self, invocation: &MethodInvocation, next: GetNext<'_>) -> AvatarResult<MethodReturn>;

    /// The kind matched against an invocation's skip set.
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::of::<Self>()
    }

    /// Display name for diagnostics.
    fn name(&self) -> &str {
        self.kind().name()
    }
}

/// A shared handle to a behavior, as stored in a pipeline.
pub type BehaviorRef = Arc<dyn AvatarBehavior>;
