use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use imbl::Vector;
use smallvec::SmallVec;

use crate::{
    disposable::Disposable,
    id::Id,
    notifier::{FxIndexMap, Subscription},
    value::Value,
};

/// A structural change of an [`ObservableVec`].
#[derive(Clone, Debug, PartialEq)]
pub enum VecChange {
    /// `item` was inserted at `index`; later items shifted up by one.
    Added { index: usize, item: Value },
    /// `item` was removed from `index`; later items shifted down by one.
    Removed { index: usize, item: Value },
}

type ChangeCallback = Rc<dyn Fn(&VecChange)>;

#[derive(Default)]
struct VecInner {
    items: RefCell<Vector<Value>>,
    listeners: RefCell<FxIndexMap<Id, ChangeCallback>>,
}

/// An ordered collection that reports insertions and removals.
///
/// Cloning yields another handle to the same collection. Equality is identity.
#[derive(Clone, Default)]
pub struct ObservableVec {
    inner: Rc<VecInner>,
}

impl fmt::Debug for ObservableVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.items.borrow().iter()).finish()
    }
}

impl<V: Into<Value>> FromIterator<V> for ObservableVec {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let items = iter.into_iter().map(Into::into).collect::<Vector<_>>();
        Self {
            inner: Rc::new(VecInner {
                items: RefCell::new(items),
                listeners: Default::default(),
            }),
        }
    }
}

impl ObservableVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// A cheap copy of the current items, unaffected by later mutations.
    pub fn snapshot(&self) -> Vector<Value> {
        self.inner.items.borrow().clone()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.borrow().iter().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &ObservableVec) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn push(&self, item: impl Into<Value>) {
        let index = self.len();
        self.insert(index, item);
    }

    /// Insert `item` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, item: impl Into<Value>) {
        let item = item.into();
        self.inner.items.borrow_mut().insert(index, item.clone());
        self.emit(&VecChange::Added { index, item });
    }

    /// Remove and return the item at `index`, or `None` if out of bounds.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let item = {
            let mut items = self.inner.items.borrow_mut();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.emit(&VecChange::Removed {
            index,
            item: item.clone(),
        });
        Some(item)
    }

    /// Remove every item, last first, reporting each removal.
    pub fn clear(&self) {
        while let Some(index) = self.len().checked_sub(1) {
            self.remove(index);
        }
    }

    /// Subscribe to structural changes.
    pub fn subscribe(&self, f: impl Fn(&VecChange) + 'static) -> Subscription {
        let id = Id::next();
        self.inner.listeners.borrow_mut().insert(id, Rc::new(f));
        let inner: Weak<VecInner> = Rc::downgrade(&self.inner);
        id.add_listener(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.borrow_mut().shift_remove(&id);
            }
        });
        Subscription { id }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn emit(&self, change: &VecChange) {
        let callbacks: SmallVec<[(Id, ChangeCallback); 4]> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(id, callback)| (*id, callback.clone()))
            .collect();

        for (id, callback) in callbacks {
            if id.is_live() {
                callback(change);
            }
        }
    }
}

impl Disposable for ObservableVec {
    /// Dispose every subscription on this collection.
    fn dispose(&self) {
        let ids: Vec<Id> = self.inner.listeners.borrow().keys().copied().collect();
        for id in ids {
            id.dispose();
        }
    }
}
