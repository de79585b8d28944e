//! Listener registry shared by the reloading controller and the builders.
//!
//! # Responsibilities
//! - Hold listener registrations keyed by an event category
//! - Deduplicate registrations by listener identity (pointer), not equality
//! - Hand out snapshots so notification runs without holding any lock
//!
//! # Design Decisions
//! - Copy-on-write list behind `ArcSwap`: registration is rare, notification
//!   is frequent and may re-enter the registry from inside a callback
//! - A notification that already took its snapshot still reaches listeners
//!   removed while it runs; notifications started after `remove` returns never do

use std::sync::Arc;

use arc_swap::ArcSwap;

/// A single registration: the category it was made for and the listener.
pub struct Registration<K, L: ?Sized> {
    pub key: K,
    pub listener: Arc<L>,
}

impl<K: Clone, L: ?Sized> Clone for Registration<K, L> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            listener: Arc::clone(&self.listener),
        }
    }
}

/// Returns true if both handles point at the same listener object.
///
/// Only the data pointer is compared; vtable pointers of the same type may
/// differ between codegen units.
pub fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Set of `(key, listener)` registrations with identity semantics.
pub struct ListenerRegistry<K, L: ?Sized> {
    entries: ArcSwap<Vec<Registration<K, L>>>,
}

impl<K, L> ListenerRegistry<K, L>
where
    K: Clone + PartialEq,
    L: ?Sized,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Register `listener` for `key`.
    ///
    /// Returns false if the same listener was already registered for that key.
    pub fn add(&self, key: K, listener: Arc<L>) -> bool {
        let previous = self.entries.rcu(|current| {
            if contains(current, &key, &listener) {
                return Arc::clone(current);
            }
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Registration {
                key: key.clone(),
                listener: Arc::clone(&listener),
            });
            Arc::new(next)
        });
        !contains(&previous, &key, &listener)
    }

    /// Remove the registration of `listener` for `key`.
    ///
    /// Returns false if there was nothing to remove.
    pub fn remove(&self, key: &K, listener: &Arc<L>) -> bool {
        let previous = self.entries.rcu(|current| {
            if !contains(current, key, listener) {
                return Arc::clone(current);
            }
            let next: Vec<_> = current
                .iter()
                .filter(|r| !(r.key == *key && same_listener(&r.listener, listener)))
                .cloned()
                .collect();
            Arc::new(next)
        });
        contains(&previous, key, listener)
    }

    /// Listeners whose registration key satisfies `accepts`, in registration order.
    pub fn matching<F>(&self, mut accepts: F) -> Vec<Arc<L>>
    where
        F: FnMut(&K) -> bool,
    {
        self.entries
            .load()
            .iter()
            .filter(|r| accepts(&r.key))
            .map(|r| Arc::clone(&r.listener))
            .collect()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, L> Default for ListenerRegistry<K, L>
where
    K: Clone + PartialEq,
    L: ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

fn contains<K: PartialEq, L: ?Sized>(
    entries: &[Registration<K, L>],
    key: &K,
    listener: &Arc<L>,
) -> bool {
    entries
        .iter()
        .any(|r| r.key == *key && same_listener(&r.listener, listener))
}
