//! Per-call side channel shared between behaviors.

use std::fmt;
use std::sync::Arc;

use avatar_core::{AvatarResult, FromValue, Value};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// A string-keyed bag of values scoped to one call.
///
/// An invocation and every return created from it hold the *same* bag:
/// cloning an `InvocationContext` shares it rather than copying it.  Behaviors
/// use it to pass data along the chain, e.g. a timing behavior stashing a
/// start timestamp for an outer behavior to read after `proceed` returns.
#[derive(Clone, Default)]
pub struct InvocationContext {
    entries: Arc<Mutex<FxHashMap<String, Value>>>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.lock().insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }

    /// The value under `key` as `T`; `Ok(None)` if the key is absent.
    pub fn get_as<T: FromValue>(&self, key: &str) -> AvatarResult<Option<T>> {
        match self.entries.lock().get(key) {
            None => Ok(None),
            Some(v) => T::from_value(v).map(Some).map_err(|e| e.into_error(key)),
        }
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.lock().remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// `true` if both handles refer to the same bag.
    pub fn ptr_eq(&self, other: &InvocationContext) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.lock().iter()).finish()
    }
}
