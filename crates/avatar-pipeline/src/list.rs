//! `BehaviorList` — the observable, batch-initializable list a pipeline owns.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use avatar_behavior::{AvatarBehavior, BehaviorRef};
use avatar_core::{AvatarError, AvatarResult};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

// ── Change notifications ──────────────────────────────────────────────────────

/// A change to a [`BehaviorList`], as delivered to subscribers.
#[derive(Clone)]
pub enum ListChange {
    Added { index: usize, behavior: BehaviorRef },
    Removed { index: usize, behavior: BehaviorRef },
    /// The list changed in bulk: after `clear`, or at the end of a batch.
    Reset,
}

impl fmt::Debug for ListChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListChange::Added { index, behavior } => {
                write!(f, "Added({index}, {})", behavior.name())
            }
            ListChange::Removed { index, behavior } => {
                write!(f, "Removed({index}, {})", behavior.name())
            }
            ListChange::Reset => f.write_str("Reset"),
        }
    }
}

/// Handle returned by [`BehaviorList::subscribe`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&ListChange) + Send + Sync>;

// ── BehaviorList ──────────────────────────────────────────────────────────────

struct Items {
    behaviors:  Vec<BehaviorRef>,
    /// Nesting depth of `begin_init` calls; notifications are held while > 0.
    init_depth: usize,
}

/// An ordered, thread-safe list of behaviors.
///
/// List order is traversal order.  Every mutation is reported to subscribers
/// as a [`ListChange`], except inside a batch (`begin_init` / `end_init`, or
/// the [`batch`][Self::batch] guard): there, per-item notifications are
/// suppressed and a single [`ListChange::Reset`] is sent when the outermost
/// batch ends.
///
/// Subscribers run on the mutating thread after the list's locks have been
/// released, so they may read or even modify the list.
pub struct BehaviorList {
    items:             RwLock<Items>,
    observers:         Mutex<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
}

impl BehaviorList {
    pub fn new() -> Self {
        Self {
            items:             RwLock::new(Items { behaviors: Vec::new(), init_depth: 0 }),
            observers:         Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.items.read().behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().behaviors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<BehaviorRef> {
        self.items.read().behaviors.get(index).cloned()
    }

    /// Index of `behavior` (compared by identity).
    pub fn position(&self, behavior: &BehaviorRef) -> Option<usize> {
        self.items.read().behaviors.iter().position(|b| Arc::ptr_eq(b, behavior))
    }

    pub fn contains(&self, behavior: &BehaviorRef) -> bool {
        self.position(behavior).is_some()
    }

    /// A copy of the current list.
    ///
    /// Later mutations do not affect the copy; a pipeline dispatches every
    /// call over one of these.
    pub fn snapshot(&self) -> Vec<BehaviorRef> {
        self.items.read().behaviors.clone()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Append `behavior` and return its shared handle.
    pub fn push<B: AvatarBehavior>(&self, behavior: B) -> BehaviorRef {
        let behavior: BehaviorRef = Arc::new(behavior);
        self.push_shared(Arc::clone(&behavior));
        behavior
    }

    pub fn push_shared(&self, behavior: BehaviorRef) {
        let change = {
            let mut items = self.items.write();
            items.behaviors.push(Arc::clone(&behavior));
            let index = items.behaviors.len() - 1;
            (items.init_depth == 0).then_some(ListChange::Added { index, behavior })
        };
        self.notify(change);
    }

    /// Insert `behavior` at `index`, shifting later behaviors back.
    pub fn insert<B: AvatarBehavior>(&self, index: usize, behavior: B) -> AvatarResult<BehaviorRef> {
        let behavior: BehaviorRef = Arc::new(behavior);
        self.insert_shared(index, Arc::clone(&behavior))?;
        Ok(behavior)
    }

    pub fn insert_shared(&self, index: usize, behavior: BehaviorRef) -> AvatarResult<()> {
        let change = {
            let mut items = self.items.write();
            let len = items.behaviors.len();
            if index > len {
                return Err(AvatarError::IndexOutOfRange { index, len });
            }
            items.behaviors.insert(index, Arc::clone(&behavior));
            (items.init_depth == 0).then_some(ListChange::Added { index, behavior })
        };
        self.notify(change);
        Ok(())
    }

    /// Remove and return the behavior at `index`.
    pub fn remove(&self, index: usize) -> AvatarResult<BehaviorRef> {
        let (removed, change) = {
            let mut items = self.items.write();
            let len = items.behaviors.len();
            if index >= len {
                return Err(AvatarError::IndexOutOfRange { index, len });
            }
            let removed = items.behaviors.remove(index);
            let change = (items.init_depth == 0)
                .then(|| ListChange::Removed { index, behavior: Arc::clone(&removed) });
            (removed, change)
        };
        self.notify(change);
        Ok(removed)
    }

    /// Remove `behavior` (compared by identity); `false` if it was not listed.
    pub fn remove_behavior(&self, behavior: &BehaviorRef) -> bool {
        let change = {
            let mut items = self.items.write();
            let Some(index) = items.behaviors.iter().position(|b| Arc::ptr_eq(b, behavior)) else {
                return false;
            };
            let removed = items.behaviors.remove(index);
            (items.init_depth == 0).then_some(ListChange::Removed { index, behavior: removed })
        };
        self.notify(change);
        true
    }

    pub fn clear(&self) {
        let change = {
            let mut items = self.items.write();
            items.behaviors.clear();
            (items.init_depth == 0).then_some(ListChange::Reset)
        };
        self.notify(change);
    }

    // ── Batch initialization ──────────────────────────────────────────────

    /// Start (or nest) a batch.  Must be paired with [`end_init`][Self::end_init].
    pub fn begin_init(&self) {
        self.items.write().init_depth += 1;
    }

    /// End a batch.  When the outermost batch ends, subscribers receive one
    /// [`ListChange::Reset`], whether or not the batch changed anything.
    pub fn end_init(&self) -> AvatarResult<()> {
        let (change, len) = {
            let mut items = self.items.write();
            if items.init_depth == 0 {
                return Err(AvatarError::NotSupported(
                    "end_init called without a matching begin_init".to_string(),
                ));
            }
            items.init_depth -= 1;
            ((items.init_depth == 0).then_some(ListChange::Reset), items.behaviors.len())
        };
        if change.is_some() {
            debug!(behaviors = len, "behavior list: batch initialization complete");
        }
        self.notify(change);
        Ok(())
    }

    /// `true` while inside a batch.
    pub fn is_initializing(&self) -> bool {
        self.items.read().init_depth > 0
    }

    /// Begin a batch that ends when the returned guard is dropped.
    ///
    /// ```rust,ignore
    /// {
    ///     let _batch = list.batch();
    ///     list.push(RecordingBehavior::new());
    ///     list.push(DefaultValueBehavior::new());
    /// } // one Reset here
    /// ```
    pub fn batch(&self) -> BatchGuard<'_> {
        self.begin_init();
        BatchGuard { list: self }
    }

    // ── Subscribers ───────────────────────────────────────────────────────

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&ListChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((id, Arc::new(observer)));
        id
    }

    /// `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    fn notify(&self, change: Option<ListChange>) {
        let Some(change) = change else { return };
        let observers: Vec<Observer> =
            self.observers.lock().iter().map(|(_, o)| Arc::clone(o)).collect();
        for observer in observers {
            observer(&change);
        }
    }
}

impl Default for BehaviorList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BehaviorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items.read();
        f.debug_list().entries(items.behaviors.iter().map(|b| b.name())).finish()
    }
}

/// Ends a batch on drop.  See [`BehaviorList::batch`].
#[must_use = "the batch ends as soon as the guard is dropped"]
pub struct BatchGuard<'a> {
    list: &'a BehaviorList,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        // The guard holds its own begin_init, so the depth is non-zero here.
        let _ = self.list.end_init();
    }
}
