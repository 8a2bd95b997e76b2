use std::cell::{Cell, RefCell};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::id::Id;

thread_local! {
    pub(crate) static RUNTIME: Runtime = Runtime::new();
}

/// The bookkeeping for one live subscription.
pub(crate) struct Listener {
    pub(crate) detach: Box<dyn FnOnce()>,
}

/// The internal runtime which stores the listener registry and the scope
/// tree in a thread local.
///
/// Notifications never go through the runtime: channels call their callbacks
/// directly and only ask the runtime whether a listener is still live.
pub(crate) struct Runtime {
    pub(crate) current_scope: Cell<Id>,
    pub(crate) children: RefCell<FxHashMap<Id, FxHashSet<Id>>>,
    pub(crate) parents: RefCell<FxHashMap<Id, Id>>,
    pub(crate) listeners: RefCell<FxHashMap<Id, Listener>>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub(crate) fn new() -> Self {
        Self {
            current_scope: Cell::new(Id::next()),
            children: Default::default(),
            parents: Default::default(),
            listeners: Default::default(),
        }
    }
}

/// The number of live listeners on the current thread.
///
/// Every [`Subscription`](crate::Subscription) that has not been disposed counts
/// as one. Mostly useful to assert that teardown does not leak.
pub fn live_listener_count() -> usize {
    RUNTIME.with(|runtime| runtime.listeners.borrow().len())
}
