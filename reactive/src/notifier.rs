use std::{
    cell::RefCell,
    fmt,
    hash::BuildHasherDefault,
    rc::{Rc, Weak},
};

use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::{disposable::Disposable, id::Id, value::Value};

pub(crate) type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

type PropertyCallback = Rc<dyn Fn(&Value)>;

/// A handle to one live change subscription.
///
/// Handles are `Copy`; the subscription they point at lives until it is
/// disposed, either directly or through the [`Scope`](crate::Scope) it was
/// created under. Disposal is terminal and idempotent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub(crate) id: Id,
}

impl Subscription {
    pub fn is_disposed(&self) -> bool {
        !self.id.is_live()
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        self.id.dispose();
    }
}

struct Entry {
    property: Rc<str>,
    callback: PropertyCallback,
}

/// The per-object change channel.
///
/// An observable object owns one `Notifier` and calls [`Notifier::notify`]
/// every time one of its properties is mutated. Callbacks run synchronously,
/// on the mutating call stack, in subscription order.
#[derive(Clone, Default)]
pub struct Notifier {
    entries: Rc<RefCell<FxIndexMap<Id, Entry>>>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.entries.borrow().len())
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to changes of `property`.
    pub fn subscribe(&self, property: &str, f: impl Fn(&Value) + 'static) -> Subscription {
        let id = Id::next();
        self.entries.borrow_mut().insert(
            id,
            Entry {
                property: property.into(),
                callback: Rc::new(f),
            },
        );
        let entries: Weak<RefCell<FxIndexMap<Id, Entry>>> = Rc::downgrade(&self.entries);
        id.add_listener(move || {
            if let Some(entries) = entries.upgrade() {
                entries.borrow_mut().shift_remove(&id);
            }
        });
        Subscription { id }
    }

    /// Deliver a change of `property` to its subscribers.
    pub fn notify(&self, property: &str, value: &Value) {
        // Collect the callbacks first, then drop the borrow before calling them.
        // Callbacks are free to subscribe, dispose and mutate.
        let callbacks: SmallVec<[(Id, PropertyCallback); 4]> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, entry)| &*entry.property == property)
            .map(|(id, entry)| (*id, entry.callback.clone()))
            .collect();

        for (id, callback) in callbacks {
            // an earlier callback may have disposed this one
            if id.is_live() {
                callback(value);
            }
        }
    }

    /// The number of live subscriptions on `property`.
    pub fn subscriber_count(&self, property: &str) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|entry| &*entry.property == property)
            .count()
    }

    /// The number of live subscriptions on any property.
    pub fn total_subscribers(&self) -> usize {
        self.entries.borrow().len()
    }
}
