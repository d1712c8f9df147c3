//! Conversions between boxed [`Value`]s and Rust types.
//!
//! [`FromValue`] unboxes; `From<T> for Value` boxes.  [`StaticType`] names the
//! declared type a Rust type stands for, which lets [`TypedArgument`]
//! validate a parameter once, at construction, instead of on every access.
//!
//! Nullability follows Rust: a plain `T` never accepts null, `Option<T>`
//! does.  `Option<i32>` corresponds to `ValueType::Nullable(I32)`, while
//! `Option<String>` is simply `ValueType::Str` (strings already admit null).
//!
//! [`TypedArgument`]: crate::TypedArgument

use std::any::Any;
use std::sync::Arc;

use crate::{AvatarError, ObjectRef, Value, ValueType};

/// Why a [`Value`] could not be unboxed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The value was null but the target type does not admit null.
    Null { expected: ValueType },
    /// The value's runtime type is incompatible with the target type.
    Mismatch { expected: ValueType, actual: String },
}

impl ConvertError {
    /// Attach the name of the slot that was being read.
    pub fn into_error(self, name: &str) -> AvatarError {
        match self {
            ConvertError::Null { expected } => AvatarError::NullValue {
                name: name.to_string(),
                expected,
            },
            ConvertError::Mismatch { expected, actual } => AvatarError::TypeMismatch {
                name: name.to_string(),
                expected,
                actual,
            },
        }
    }
}

/// Unbox a [`Value`] into `Self`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ConvertError>;
}

/// The declared type a Rust type corresponds to.
pub trait StaticType {
    fn static_type() -> ValueType;
}

fn mismatch<T: StaticType>(value: &Value) -> ConvertError {
    match value {
        Value::Null => ConvertError::Null {
            expected: T::static_type(),
        },
        other => ConvertError::Mismatch {
            expected: T::static_type(),
            actual:   other.type_name(),
        },
    }
}

// ── Primitives ────────────────────────────────────────────────────────────────

macro_rules! primitive {
    ($ty:ty, $variant:ident, $value_type:expr) => {
        impl StaticType for $ty {
            #[inline]
            fn static_type() -> ValueType {
                $value_type
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ConvertError> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch::<$ty>(other)),
                }
            }
        }
    };
}

primitive!(bool, Bool, ValueType::Bool);
primitive!(i32, I32, ValueType::I32);
primitive!(i64, I64, ValueType::I64);
primitive!(f64, F64, ValueType::F64);
primitive!(String, Str, ValueType::Str);

// ── Composites ────────────────────────────────────────────────────────────────

impl StaticType for () {
    fn static_type() -> ValueType {
        ValueType::Unit
    }
}

/// Only null converts to `()`; used to read the result of a `void` call.
impl FromValue for () {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(()),
            other => Err(mismatch::<()>(other)),
        }
    }
}

impl StaticType for Value {
    fn static_type() -> ValueType {
        ValueType::Any
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        Ok(value.clone())
    }
}

impl<T: StaticType> StaticType for Option<T> {
    fn static_type() -> ValueType {
        ValueType::nullable(T::static_type())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: StaticType> StaticType for Vec<T> {
    fn static_type() -> ValueType {
        ValueType::list(T::static_type())
    }
}

impl<T: FromValue + StaticType> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch::<Vec<T>>(other)),
        }
    }
}

impl StaticType for ObjectRef {
    fn static_type() -> ValueType {
        ValueType::Any
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Object(obj) => Ok(obj.clone()),
            other => Err(mismatch::<ObjectRef>(other)),
        }
    }
}

impl<T: Any + Send + Sync> StaticType for Arc<T> {
    fn static_type() -> ValueType {
        ValueType::object::<T>()
    }
}

impl<T: Any + Send + Sync> FromValue for Arc<T> {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        value
            .as_object()
            .and_then(ObjectRef::downcast::<T>)
            .ok_or_else(|| mismatch::<Arc<T>>(value))
    }
}
