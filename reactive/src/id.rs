use std::sync::atomic::AtomicU64;

use crate::runtime::{Listener, RUNTIME};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A stable identifier for a listener or a scope.
pub(crate) struct Id(u64);

impl Id {
    pub(crate) fn next() -> Id {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Id(COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
    }

    /// Attach this id to the current scope, so it is disposed together with it.
    pub(crate) fn set_scope(&self) {
        RUNTIME.with(|runtime| {
            let scope = runtime.current_scope.get();
            self.set_parent(scope);
        });
    }

    pub(crate) fn set_parent(&self, parent: Id) {
        RUNTIME.with(|runtime| {
            runtime
                .children
                .borrow_mut()
                .entry(parent)
                .or_default()
                .insert(*self);
            runtime.parents.borrow_mut().insert(*self, parent);
        });
    }

    /// Register a live listener under the current scope. `detach` runs once,
    /// when the listener is disposed.
    pub(crate) fn add_listener(&self, detach: impl FnOnce() + 'static) {
        RUNTIME.with(|runtime| {
            runtime.listeners.borrow_mut().insert(
                *self,
                Listener {
                    detach: Box::new(detach),
                },
            );
        });
        self.set_scope();
    }

    pub(crate) fn is_live(&self) -> bool {
        RUNTIME.with(|runtime| runtime.listeners.borrow().contains_key(self))
    }

    pub(crate) fn dispose(&self) {
        // Take everything out of the runtime first: detach closures and child
        // disposal may re-enter it.
        let (children, listener, parent) = RUNTIME.with(|runtime| {
            (
                runtime.children.borrow_mut().remove(self),
                runtime.listeners.borrow_mut().remove(self),
                runtime.parents.borrow_mut().remove(self),
            )
        });

        if let Some(parent) = parent {
            RUNTIME.with(|runtime| {
                if let Some(siblings) = runtime.children.borrow_mut().get_mut(&parent) {
                    siblings.remove(self);
                }
            });
        }

        if let Some(children) = children {
            for child in children {
                child.dispose();
            }
        }

        if let Some(listener) = listener {
            (listener.detach)();
        }
    }
}
