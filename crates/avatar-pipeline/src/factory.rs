//! Pipeline factories and the process-wide default.

use std::sync::{Arc, LazyLock};

use avatar_core::TypeKey;

use crate::{AmbientDefault, BehaviorPipeline, LocalDefaultGuard};

/// Builds a fresh pipeline for each newly constructed avatar.
///
/// `avatar_kind` identifies the proxy type being constructed, so a factory
/// can seed different behaviors per type.  Closures of the form
/// `Fn(TypeKey) -> BehaviorPipeline` are factories too.
pub trait PipelineFactory: Send + Sync {
    fn create_pipeline(&self, avatar_kind: TypeKey) -> BehaviorPipeline;
}

impl<F> PipelineFactory for F
where
    F: Fn(TypeKey) -> BehaviorPipeline + Send + Sync,
{
    fn create_pipeline(&self, avatar_kind: TypeKey) -> BehaviorPipeline {
        self(avatar_kind)
    }
}

/// The initial default: every avatar starts with an empty pipeline.
#[derive(Default, Debug, Clone, Copy)]
pub struct EmptyPipelineFactory;

impl PipelineFactory for EmptyPipelineFactory {
    fn create_pipeline(&self, _avatar_kind: TypeKey) -> BehaviorPipeline {
        BehaviorPipeline::new()
    }
}

static DEFAULT: LazyLock<AmbientDefault<dyn PipelineFactory>> = LazyLock::new(|| {
    let initial: Arc<dyn PipelineFactory> = Arc::new(EmptyPipelineFactory);
    AmbientDefault::new("pipeline factory", initial)
});

/// Access to the default [`PipelineFactory`].
///
/// Proxy constructors call [`create_pipeline`] (or
/// `PipelineFactories::current()`) rather than holding a factory themselves.
pub struct PipelineFactories;

impl PipelineFactories {
    /// This thread's override if one is installed, else the global default.
    pub fn current() -> Arc<dyn PipelineFactory> {
        DEFAULT.current()
    }

    /// This thread's override, if one is installed.
    pub fn local() -> Option<Arc<dyn PipelineFactory>> {
        DEFAULT.local()
    }

    pub fn global() -> Arc<dyn PipelineFactory> {
        DEFAULT.global()
    }

    /// Replace the process-wide default; returns the previous one.
    pub fn set_global(factory: Arc<dyn PipelineFactory>) -> Arc<dyn PipelineFactory> {
        DEFAULT.set_global(factory)
    }

    /// Override the default on this thread until the guard drops.
    pub fn set_local(factory: Arc<dyn PipelineFactory>) -> LocalDefaultGuard {
        DEFAULT.set_local(factory)
    }

    pub fn with_local<R>(factory: Arc<dyn PipelineFactory>, f: impl FnOnce() -> R) -> R {
        DEFAULT.with_local(factory, f)
    }
}

/// A new pipeline for an avatar of type `T`, from the current default factory.
pub fn create_pipeline<T: ?Sized + 'static>() -> BehaviorPipeline {
    PipelineFactories::current().create_pipeline(TypeKey::of::<T>())
}
