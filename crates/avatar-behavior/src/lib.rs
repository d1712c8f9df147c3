//! `avatar-behavior` — invocations, returns, and the behavior trait.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                          |
//! |-------------------|-------------------------------------------------------------------|
//! | [`context`]       | `InvocationContext` — per-call bag shared by invocation and return |
//! | [`invocation`]    | `MethodInvocation`, `CallBase`                                    |
//! | [`method_return`] | `MethodReturn`                                                    |
//! | [`behavior`]      | `AvatarBehavior` trait, `BehaviorKind`, `BehaviorRef`             |
//! | [`next`]          | `GetNext` / `NextStep` — the index cursor that threads a call     |
//! | [`anonymous`]     | `AnonymousBehavior` — closure-backed behavior                     |
//! | [`recording`]     | `RecordingBehavior` — logs every call and its result              |
//! | [`default_value`] | `DefaultValueBehavior`, `DefaultValueProvider`, `DefaultValues`   |
//! | [`equality`]      | `DefaultEqualityBehavior` — identity `hash_code` / `equals`       |
//!
//! # Design notes
//!
//! A call is threaded through behaviors without building closures: the
//! pipeline snapshots its behavior list into a slice, and "the next behavior"
//! is a pure function of (slice, position, invocation).  [`GetNext`] carries
//! that cursor; each behavior decides whether to stop the call by returning a
//! [`MethodReturn`] or to continue it with [`GetNext::proceed`].
//!
//! When the cursor runs off the end of the slice the call falls back to the
//! invocation's bound base implementation, or fails with
//! `AvatarError::NotImplemented`.

pub mod anonymous;
pub mod behavior;
pub mod context;
pub mod default_value;
pub mod equality;
pub mod invocation;
pub mod method_return;
pub mod next;
pub mod recording;

#[cfg(test)]
mod tests;

pub use anonymous::AnonymousBehavior;
pub use behavior::{AvatarBehavior, BehaviorKind, BehaviorRef};
pub use context::InvocationContext;
pub use default_value::{DefaultValueBehavior, DefaultValueProvider, DefaultValues};
pub use equality::{DefaultEqualityBehavior, equals_method, hash_code_method};
pub use invocation::{CallBase, MethodInvocation};
pub use method_return::MethodReturn;
pub use next::{GetNext, NextStep};
pub use recording::{CallSummary, RecordedCall, RecordingBehavior};
