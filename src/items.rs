//! Binding an observable collection to a list-like destination.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use avalon_reactive::{Disposable, ObservableVec, PropertyError, Subscription, Value, VecChange};

use crate::error::{report, BindingError};

/// An item the adapter cannot display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRejected {
    /// What the adapter accepts, e.g. `"text"`.
    pub expected: &'static str,
}

/// The per-control capability a collection is bound through.
///
/// Indices are positions among the items the adapter accepted.
pub trait ItemsAdapter {
    /// Insert `item` at `index`, shifting later items up.
    fn insert_item(&self, item: &Value, index: usize) -> Result<(), ItemRejected>;

    /// Remove the item at `index`, shifting later items down.
    fn remove_item(&self, index: usize);

    fn remove_all_items(&self);
}

struct ItemsState {
    adapter: Rc<dyn ItemsAdapter>,
    items: RefCell<Option<ObservableVec>>,
    /// Mirrors the bound collection: whether the adapter accepted each item.
    accepted: RefCell<Vec<bool>>,
    /// Created in the scope current at `bind`, so a binding that writes the
    /// items owns it.
    subscription: Cell<Option<Subscription>>,
}

impl ItemsState {
    /// The adapter position of collection index `index`.
    fn visible_index(&self, index: usize) -> usize {
        self.accepted.borrow()[..index]
            .iter()
            .filter(|accepted| **accepted)
            .count()
    }

    fn insert(&self, index: usize, item: &Value) {
        let visible = self.visible_index(index);
        self.accepted.borrow_mut().insert(index, true);
        if let Err(rejected) = self.adapter.insert_item(item, visible) {
            if let Some(accepted) = self.accepted.borrow_mut().get_mut(index) {
                *accepted = false;
            }
            report(BindingError::AdapterTypeMismatch {
                index,
                expected: rejected.expected,
                found: item.kind(),
            });
        }
    }

    fn changed(&self, change: &VecChange) {
        match change {
            VecChange::Added { index, item } => {
                if *index > self.accepted.borrow().len() {
                    // out of sync with the collection
                    self.reload();
                    return;
                }
                self.insert(*index, item);
            }
            VecChange::Removed { index, .. } => {
                if *index >= self.accepted.borrow().len() {
                    self.reload();
                    return;
                }
                let visible = self.visible_index(*index);
                let was_accepted = self.accepted.borrow_mut().remove(*index);
                if was_accepted {
                    self.adapter.remove_item(visible);
                }
            }
        }
    }

    fn reload(&self) {
        self.adapter.remove_all_items();
        self.accepted.borrow_mut().clear();
        let snapshot = self.items.borrow().as_ref().map(ObservableVec::snapshot);
        let Some(snapshot) = snapshot else {
            return;
        };
        tracing::debug!(items = snapshot.len(), "reloading all items");
        for (index, item) in snapshot.iter().enumerate() {
            self.insert(index, item);
        }
    }

    fn unsubscribe(&self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
    }

    fn is_following(&self, items: &ObservableVec) -> bool {
        let live = self
            .subscription
            .get()
            .is_some_and(|subscription| !subscription.is_disposed());
        live && self
            .items
            .borrow()
            .as_ref()
            .is_some_and(|current| current.ptr_eq(items))
    }
}

impl Drop for ItemsState {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Keeps an [`ItemsAdapter`] in step with an [`ObservableVec`].
///
/// Insertions and removals are forwarded one by one, without reloading.
/// Replacing the collection with a different one reloads every item. Items
/// the adapter rejects are skipped and reported; they keep their slot in the
/// collection so later indices stay correct.
///
/// The collection subscription belongs to the [`Scope`](avalon_reactive::Scope)
/// current when the items are bound. When a binding writes the items, that
/// is the binding's scope, so the control stops following the collection once
/// the binding is disposed or re-attached.
#[derive(Clone)]
pub struct ItemsController {
    state: Rc<ItemsState>,
}

impl fmt::Debug for ItemsController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemsController")
            .field("items", &self.state.items.borrow())
            .finish()
    }
}

impl ItemsController {
    pub fn new(adapter: Rc<dyn ItemsAdapter>) -> Self {
        Self {
            state: Rc::new(ItemsState {
                adapter,
                items: RefCell::new(None),
                accepted: RefCell::new(Vec::new()),
                subscription: Cell::new(None),
            }),
        }
    }

    /// The bound collection, `Null` when there is none.
    pub fn items(&self) -> Value {
        self.state
            .items
            .borrow()
            .clone()
            .map_or(Value::Null, Value::List)
    }

    /// Bind to the collection held in `value`, as written by a binding.
    ///
    /// `Null` unbinds and clears the adapter. Anything other than a list is
    /// refused.
    pub fn set_items(&self, value: &Value) -> Result<(), PropertyError> {
        match value {
            Value::List(items) => {
                self.bind(items.clone());
                Ok(())
            }
            Value::Null => {
                self.unbind();
                Ok(())
            }
            other => Err(PropertyError::type_mismatch("items", "list", other.kind())),
        }
    }

    /// Observe `items` and reload the adapter from it. Binding the collection
    /// already being followed does nothing.
    pub fn bind(&self, items: ObservableVec) {
        if self.state.is_following(&items) {
            return;
        }
        self.state.unsubscribe();
        let state: Weak<ItemsState> = Rc::downgrade(&self.state);
        let subscription = items.subscribe(move |change| {
            if let Some(state) = state.upgrade() {
                state.changed(change);
            }
        });
        self.state.subscription.set(Some(subscription));
        self.state.items.replace(Some(items));
        self.reload_all_items();
    }

    /// Stop observing and clear the adapter.
    pub fn unbind(&self) {
        self.state.unsubscribe();
        self.state.items.replace(None);
        self.reload_all_items();
    }

    /// Clear the adapter and insert every item of the collection again, in
    /// order.
    pub fn reload_all_items(&self) {
        self.state.reload();
    }

    /// The number of items the adapter currently shows.
    pub fn visible_count(&self) -> usize {
        self.state
            .accepted
            .borrow()
            .iter()
            .filter(|accepted| **accepted)
            .count()
    }
}

impl Disposable for ItemsController {
    fn dispose(&self) {
        self.state.unsubscribe();
    }
}
