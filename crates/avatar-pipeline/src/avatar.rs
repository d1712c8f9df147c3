//! The `Avatar` trait implemented by proxy types.

use avatar_behavior::{AvatarBehavior, BehaviorRef};

use crate::BehaviorPipeline;

/// A proxy object whose members forward to a [`BehaviorPipeline`].
///
/// How a proxy is produced (generated code or written by hand) is not this
/// crate's concern; it only needs to expose its pipeline so callers can
/// configure behaviors after construction.
pub trait Avatar: Send + Sync {
    fn pipeline(&self) -> &BehaviorPipeline;

    /// Append `behavior` to this avatar's pipeline.
    fn add_behavior<B: AvatarBehavior>(&self, behavior: B) -> BehaviorRef
    where
        Self: Sized,
    {
        self.pipeline().behaviors().push(behavior)
    }
}
