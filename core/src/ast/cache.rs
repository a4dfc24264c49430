//! Per-node resolution caches.

use core::{cell::RefCell, fmt};

use crate::api::ContextId;

/// A write-once-per-context slot attached to a tree node.
///
/// The slot remembers which evaluation context filled it. A lookup from any other
/// context misses, so a tree reused with different hooks or options never observes a
/// resolution made for someone else. Cloning a node yields an empty slot.
pub(crate) struct NodeCache<T> {
    slot: RefCell<Option<(ContextId, T)>>,
}

impl<T: Clone> NodeCache<T> {
    pub(crate) fn get(&self, context: ContextId) -> Option<T> {
        match &*self.slot.borrow() {
            Some((owner, value)) if *owner == context => Some(value.clone()),
            _ => None,
        }
    }

    pub(crate) fn set(&self, context: ContextId, value: T) {
        *self.slot.borrow_mut() = Some((context, value));
    }
}

impl<T> NodeCache<T> {
    pub(crate) fn clear(&self) {
        self.slot.borrow_mut().take();
    }
}

impl<T> Default for NodeCache<T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }
}

impl<T> Clone for NodeCache<T> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<T> fmt::Debug for NodeCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.slot.borrow() {
            Some((owner, _)) => write!(f, "NodeCache({:?})", owner),
            None => write!(f, "NodeCache(empty)"),
        }
    }
}
