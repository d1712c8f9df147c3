//! `avatar-core` — the data model shared by every `avatar-*` crate.
//!
//! This crate has no `avatar-*` dependencies.  It describes *what* a call
//! looks like (which method, which parameters, which values) without knowing
//! anything about how calls are intercepted.
//!
//! # What lives here
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`types`]       | `TypeKey`, `ValueType` (declared types + assignability)       |
//! | [`value`]       | `Value`, `ObjectRef`, `WeakObject`                            |
//! | [`marshal`]     | `FromValue`, `StaticType`, `ConvertError`                     |
//! | [`method`]      | `Direction`, `ParameterInfo`, `MethodSignature`, builder      |
//! | [`argument`]    | `Argument`, `TypedArgument<T>`, `ArgumentCollection`          |
//! | [`exception`]   | `Exception` — a shared, identity-comparable error             |
//! | [`error`]       | `AvatarError`, `AvatarResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to `Direction`.             |

pub mod argument;
pub mod error;
pub mod exception;
pub mod marshal;
pub mod method;
pub mod types;
pub mod value;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use argument::{Argument, ArgumentCollection, ArgumentKey, TypedArgument};
pub use error::{AvatarError, AvatarResult};
pub use exception::Exception;
pub use marshal::{ConvertError, FromValue, StaticType};
pub use method::{Direction, MethodBuilder, MethodSignature, ParameterInfo};
pub use types::{TypeKey, ValueType};
pub use value::{ObjectRef, Value, WeakObject};
