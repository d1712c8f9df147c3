//! Declared types and the assignability rule.
//!
//! # Design
//!
//! A proxy describes each parameter and return slot with a [`ValueType`].
//! The set is closed: primitives, strings, lists, opaque objects keyed by
//! their Rust [`TypeId`], the universal `Any`, and `Nullable` wrappers.
//!
//! Primitive numeric and boolean types are *value types*: null is only
//! assignable to them through `Nullable`.  Everything else is a *reference
//! type* and admits null directly.  There is no implicit numeric widening;
//! an `I32` value is not assignable to an `I64` slot.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::Value;

// ── TypeKey ───────────────────────────────────────────────────────────────────

/// Identity of a Rust type, with its name kept for diagnostics.
///
/// Equality, ordering and hashing use only the `TypeId`.
#[derive(Copy, Clone, Debug)]
pub struct TypeKey {
    id:   TypeId,
    name: &'static str,
}

impl TypeKey {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id:   TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `my_crate::proxies::CalculatorAvatar`.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name without its module path: `CalculatorAvatar`.
    ///
    /// Generic arguments are kept as written (`Wrapper<alloc::string::String>`).
    pub fn short_name(&self) -> &'static str {
        let name = self.name.strip_prefix("dyn ").unwrap_or(self.name);
        let head_end = name.find('<').unwrap_or(name.len());
        let start = name[..head_end].rfind("::").map_or(0, |i| i + 2);
        &name[start..]
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ── ValueType ─────────────────────────────────────────────────────────────────

/// The declared type of a parameter or return slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value (`void` return).
    Unit,
    Bool,
    I32,
    I64,
    F64,
    Str,
    /// Homogeneous list; every element must be assignable to the element type.
    List(Box<ValueType>),
    /// An opaque object of exactly this Rust type.
    Object(TypeKey),
    /// Accepts any value, including null.
    Any,
    /// A value type that also admits null.
    Nullable(Box<ValueType>),
}

impl ValueType {
    /// Wrap `inner` so it admits null.
    ///
    /// Reference types already admit null and are returned unchanged, as is
    /// a type that is already `Nullable`.
    pub fn nullable(inner: ValueType) -> Self {
        if inner.is_value_type() {
            ValueType::Nullable(Box::new(inner))
        } else {
            inner
        }
    }

    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    pub fn object<T: ?Sized + 'static>() -> Self {
        ValueType::Object(TypeKey::of::<T>())
    }

    /// `true` for `Bool`, `I32`, `I64` and `F64`.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            ValueType::Bool | ValueType::I32 | ValueType::I64 | ValueType::F64
        )
    }

    /// `true` if null is assignable to this type.
    pub fn admits_null(&self) -> bool {
        !self.is_value_type()
    }

    /// The wrapped type for `Nullable`, otherwise `self`.
    pub fn underlying(&self) -> &ValueType {
        match self {
            ValueType::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Whether `value` may be stored in a slot of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Any, _) => true,
            (ty, Value::Null) => ty.admits_null(),
            (ValueType::Nullable(inner), v) => inner.accepts(v),
            (ValueType::Bool, Value::Bool(_))
            | (ValueType::I32, Value::I32(_))
            | (ValueType::I64, Value::I64(_))
            | (ValueType::F64, Value::F64(_))
            | (ValueType::Str, Value::Str(_)) => true,
            (ValueType::List(element), Value::List(items)) => {
                items.iter().all(|item| element.accepts(item))
            }
            (ValueType::Object(key), Value::Object(obj)) => obj.type_key() == *key,
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Unit => f.write_str("void"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::I32 => f.write_str("i32"),
            ValueType::I64 => f.write_str("i64"),
            ValueType::F64 => f.write_str("f64"),
            ValueType::Str => f.write_str("string"),
            ValueType::List(element) => write!(f, "[{element}]"),
            ValueType::Object(key) => write!(f, "{key}"),
            ValueType::Any => f.write_str("any"),
            ValueType::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}
