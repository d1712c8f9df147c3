//! Process-wide defaults with per-thread overrides.
//!
//! An [`AmbientDefault`] holds one global value.  Code running on a thread
//! can shadow it for a scope with [`set_local`][AmbientDefault::set_local];
//! the override is invisible to every other thread and disappears when the
//! returned guard drops.  Parallel tests use this to install their own
//! factories without touching each other.

use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::debug;

static NEXT_SLOT: AtomicUsize = AtomicUsize::new(0);
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

struct Override {
    slot:  usize,
    token: u64,
    value: Box<dyn Any>,
}

thread_local! {
    /// Active overrides on this thread, innermost last.
    static LOCAL: RefCell<Vec<Override>> = const { RefCell::new(Vec::new()) };
}

/// A global default of type `Arc<T>` with thread-scoped overrides.
pub struct AmbientDefault<T: ?Sized + 'static> {
    name:   &'static str,
    slot:   usize,
    global: RwLock<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> AmbientDefault<T> {
    pub fn new(name: &'static str, initial: Arc<T>) -> Self {
        Self {
            name,
            slot: NEXT_SLOT.fetch_add(1, Ordering::Relaxed),
            global: RwLock::new(initial),
        }
    }

    /// The innermost override on this thread, or the global value.
    pub fn current(&self) -> Arc<T> {
        self.local().unwrap_or_else(|| self.global())
    }

    pub fn global(&self) -> Arc<T> {
        Arc::clone(&self.global.read())
    }

    /// Replace the global value, returning the previous one.
    pub fn set_global(&self, value: Arc<T>) -> Arc<T> {
        debug!(default = self.name, "ambient: global default replaced");
        std::mem::replace(&mut *self.global.write(), value)
    }

    /// The innermost override on this thread, if any.
    pub fn local(&self) -> Option<Arc<T>> {
        LOCAL.with(|stack| {
            stack
                .borrow()
                .iter()
                .rev()
                .find(|entry| entry.slot == self.slot)
                .and_then(|entry| entry.value.downcast_ref::<Arc<T>>())
                .cloned()
        })
    }

    /// Shadow the global value on this thread until the guard drops.
    pub fn set_local(&self, value: Arc<T>) -> LocalDefaultGuard {
        let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        let depth = LOCAL.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(Override { slot: self.slot, token, value: Box::new(value) });
            stack.len()
        });
        debug!(default = self.name, depth, "ambient: local override installed");
        LocalDefaultGuard { token, _not_send: PhantomData }
    }

    /// Run `f` with `value` installed as this thread's override.
    pub fn with_local<R>(&self, value: Arc<T>, f: impl FnOnce() -> R) -> R {
        let _guard = self.set_local(value);
        f()
    }
}

/// Removes a thread-local override when dropped.
///
/// Only the guard's own override is removed, so guards may drop in any
/// order.  The guard cannot leave the thread that created it.
#[must_use = "the override is removed as soon as the guard is dropped"]
pub struct LocalDefaultGuard {
    token:     u64,
    _not_send: PhantomData<*const ()>,
}

impl Drop for LocalDefaultGuard {
    fn drop(&mut self) {
        let token = self.token;
        // The thread-local may already be gone during thread teardown.
        let _ = LOCAL.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(i) = stack.iter().rposition(|entry| entry.token == token) {
                // Drop the boxed value after releasing the borrow.
                let removed = stack.remove(i);
                drop(stack);
                drop(removed);
            }
        });
    }
}
