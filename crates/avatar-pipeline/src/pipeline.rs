//! `BehaviorPipeline` — threads a call through an ordered list of behaviors.

use std::fmt;

use avatar_behavior::{AnonymousBehavior, BehaviorRef, GetNext, MethodInvocation, MethodReturn};
use avatar_core::{AvatarResult, FromValue};
use tracing::trace;

use crate::BehaviorList;

/// An ordered chain of behaviors plus the dispatch algorithm over it.
///
/// # Dispatch
///
/// 1. Snapshot the behavior list.  Changes made while the call runs, even by
///    a behavior in this same call, only affect later calls.
/// 2. Run the first behavior that applies to the invocation and is not in
///    its skip set.  That behavior gets a [`GetNext`] cursor positioned just
///    past itself and either answers the call or continues it.
/// 3. When no behavior remains, run the invocation's base implementation or
///    fail with `AvatarError::NotImplemented`.
///
/// A pipeline is `Send + Sync`; calls on different threads may run
/// concurrently and may see different versions of the list.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = BehaviorPipeline::new();
/// pipeline.behaviors().push(RecordingBehavior::new());
/// pipeline.add(|inv, _next| inv.create_return(Some(42.into())));
///
/// let answer: i32 = pipeline.execute_as(&invocation)?;
/// ```
#[derive(Default)]
pub struct BehaviorPipeline {
    behaviors: BehaviorList,
}

impl BehaviorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pipeline seeded with `behaviors` in one batch.
    pub fn with_behaviors(behaviors: impl IntoIterator<Item = BehaviorRef>) -> Self {
        let pipeline = Self::new();
        {
            let _batch = pipeline.behaviors.batch();
            for behavior in behaviors {
                pipeline.behaviors.push_shared(behavior);
            }
        }
        pipeline
    }

    /// The live behavior list.
    #[inline]
    pub fn behaviors(&self) -> &BehaviorList {
        &self.behaviors
    }

    /// Append a closure-backed behavior.
    pub fn add<F>(&self, execute: F) -> BehaviorRef
    where
        F: Fn(&MethodInvocation, GetNext<'_>) -> AvatarResult<MethodReturn> + Send + Sync + 'static,
    {
        self.behaviors.push(AnonymousBehavior::new(execute))
    }

    /// Insert a closure-backed behavior at `index`.
    pub fn insert<F>(&self, index: usize, execute: F) -> AvatarResult<BehaviorRef>
    where
        F: Fn(&MethodInvocation, GetNext<'_>) -> AvatarResult<MethodReturn> + Send + Sync + 'static,
    {
        self.behaviors.insert(index, AnonymousBehavior::new(execute))
    }

    /// Dispatch `invocation`.
    ///
    /// With `throw_on_exception`, an exception return comes back as
    /// `Err(AvatarError::Exception(..))` carrying that same exception;
    /// otherwise it is returned as data.  `Err`s raised by behaviors
    /// propagate unchanged either way.
    pub fn invoke(
        &self,
        invocation:         &MethodInvocation,
        throw_on_exception: bool,
    ) -> AvatarResult<MethodReturn> {
        let snapshot = self.behaviors.snapshot();
        trace!(
            behaviors = snapshot.len(),
            method = invocation.method().name(),
            "pipeline: invoke"
        );
        let result = GetNext::chain(&snapshot, 0).proceed(invocation)?;
        if throw_on_exception { result.into_result() } else { Ok(result) }
    }

    /// [`invoke`][Self::invoke] with `throw_on_exception` set.
    pub fn execute(&self, invocation: &MethodInvocation) -> AvatarResult<MethodReturn> {
        self.invoke(invocation, true)
    }

    /// [`execute`][Self::execute], then convert the return value to `T`.
    pub fn execute_as<T: FromValue>(&self, invocation: &MethodInvocation) -> AvatarResult<T> {
        self.execute(invocation)?.get::<T>()
    }
}

impl fmt::Debug for BehaviorPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorPipeline").field("behaviors", &self.behaviors).finish()
    }
}
