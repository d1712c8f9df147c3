//! Dynamically typed argument and return values.
//!
//! [`Value`] is the boxed form every argument takes inside an
//! [`ArgumentCollection`][crate::ArgumentCollection].  Equality is structural
//! for data and by identity for objects, which is what invocation equality
//! needs: two calls with "the same" object argument mean the same instance.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use rustc_hash::FxHasher;

use crate::TypeKey;

// ── Value ─────────────────────────────────────────────────────────────────────

/// A boxed argument or return value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    Str(String),
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Box `value` as a fresh shared object.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(ObjectRef::new(value))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short runtime type description used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::I32(_) => "i32".to_string(),
            Value::I64(_) => "i64".to_string(),
            Value::F64(_) => "f64".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Object(obj) => obj.type_key().to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            // Bitwise so that `Eq` and `Hash` stay lawful (NaN == NaN).
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::I32(n) => n.hash(state),
            Value::I64(n) => n.hash(state),
            Value::F64(n) => n.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::List(items) => items.hash(state),
            Value::Object(obj) => obj.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::I32(n) => write!(f, "{n}"),
            Value::I64(n) => write!(f, "{n}"),
            Value::F64(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => write!(f, "{obj}"),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::I32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::I64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::F64(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl<T: Any + Send + Sync> From<Arc<T>> for Value {
    fn from(arc: Arc<T>) -> Self {
        Value::Object(ObjectRef::from_arc(arc))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

// ── ObjectRef ─────────────────────────────────────────────────────────────────

/// A shared, type-erased object compared by identity.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Arc<dyn Any + Send + Sync>,
    key:   TypeKey,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(arc: Arc<T>) -> Self {
        Self {
            inner: arc,
            key:   TypeKey::of::<T>(),
        }
    }

    /// The concrete type the object was created with.
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.addr() == other.addr()
    }

    /// Address of the shared allocation; stable for the object's lifetime.
    #[inline]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    /// Identity-based hash code, equal for every handle to the same object.
    pub fn identity_hash(&self) -> i32 {
        identity_hash(self.addr())
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Arc::downgrade(&self.inner),
            key:   self.key,
            addr:  self.addr(),
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}@{:#x})", self.key, self.addr())
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

// ── WeakObject ────────────────────────────────────────────────────────────────

/// A non-owning object reference.
///
/// Used as the target of an invocation so that recorded calls never keep a
/// proxy alive.  Identity survives the object being dropped.
#[derive(Clone)]
pub struct WeakObject {
    inner: Weak<dyn Any + Send + Sync>,
    key:   TypeKey,
    addr:  usize,
}

impl WeakObject {
    pub fn from_weak<T: Any + Send + Sync>(weak: Weak<T>) -> Self {
        let addr = weak.as_ptr() as *const () as usize;
        Self {
            inner: weak,
            key:   TypeKey::of::<T>(),
            addr,
        }
    }

    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.inner.upgrade().map(|inner| ObjectRef {
            inner,
            key: self.key,
        })
    }

    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn addr(&self) -> usize {
        self.addr
    }

    /// `true` if `obj` is the object this reference points at.
    pub fn is(&self, obj: &ObjectRef) -> bool {
        self.addr() == obj.addr()
    }

    pub fn identity_hash(&self) -> i32 {
        identity_hash(self.addr())
    }
}

impl From<&ObjectRef> for WeakObject {
    fn from(obj: &ObjectRef) -> Self {
        obj.downgrade()
    }
}

impl<T: Any + Send + Sync> From<Weak<T>> for WeakObject {
    fn from(weak: Weak<T>) -> Self {
        WeakObject::from_weak(weak)
    }
}

impl<T: Any + Send + Sync> From<&Arc<T>> for WeakObject {
    fn from(arc: &Arc<T>) -> Self {
        WeakObject::from_weak(Arc::downgrade(arc))
    }
}

impl PartialEq for WeakObject {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for WeakObject {}

impl Hash for WeakObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakObject({}@{:#x})", self.key, self.addr())
    }
}

fn identity_hash(addr: usize) -> i32 {
    let mut hasher = FxHasher::default();
    addr.hash(&mut hasher);
    hasher.finish() as i32
}
