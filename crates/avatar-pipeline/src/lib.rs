//! `avatar-pipeline` — the behavior pipeline and the factories around it.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                              |
//! |--------------------|-----------------------------------------------------------------------|
//! | [`list`]           | `BehaviorList` — observable, batch-initializable list; `ListChange`   |
//! | [`pipeline`]       | `BehaviorPipeline` — `invoke`, `execute`, `execute_as`                |
//! | [`avatar`]         | `Avatar` trait implemented by proxies                                 |
//! | [`ambient`]        | `AmbientDefault` — global value with thread-scoped overrides          |
//! | [`factory`]        | `PipelineFactory`, `EmptyPipelineFactory`, `PipelineFactories`        |
//! | [`avatar_factory`] | `AvatarFactory`, `AvatarRequest`, registry and not-implemented factories |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use avatar_behavior::{MethodInvocation, RecordingBehavior};
//! use avatar_pipeline::BehaviorPipeline;
//!
//! let pipeline = BehaviorPipeline::new();
//! let recorder = Arc::new(RecordingBehavior::new());
//! pipeline.behaviors().push_shared(recorder.clone());
//!
//! let invocation = MethodInvocation::new(&target, add_method, vec![2.into(), 3.into()])?
//!     .with_call_base(|inv, _| {
//!         let sum = inv.arguments().get::<i32>("a")? + inv.arguments().get::<i32>("b")?;
//!         inv.create_return(Some(sum.into()))
//!     });
//! let sum: i32 = pipeline.execute_as(&invocation)?;
//! assert_eq!(recorder.len(), 1);
//! ```

pub mod ambient;
pub mod avatar;
pub mod avatar_factory;
pub mod factory;
pub mod list;
pub mod pipeline;


pub use ambient::{AmbientDefault, LocalDefaultGuard};
pub use avatar::Avatar;
pub use avatar_factory::{
    AvatarFactories, AvatarFactory, AvatarRequest, AvatarSignature, NotImplementedAvatarFactory,
    RegistryAvatarFactory,
};
pub use factory::{EmptyPipelineFactory, PipelineFactories, PipelineFactory, create_pipeline};
pub use list::{BatchGuard, BehaviorList, ListChange, SubscriptionId};
pub use pipeline::BehaviorPipeline;
