use std::fmt;

use crate::{id::Id, runtime::RUNTIME};

/// You can manually control the lifetime of subscriptions by using Scope.
/// Every subscription is created under a Scope, explicitly or implicitly,
/// and when you dispose the Scope, it will dispose all the subscriptions
/// that belong to the Scope and all the child Scopes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope(pub(crate) Id);

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Scope");
        s.field("id", &self.0);
        s.finish()
    }
}

impl Scope {
    /// Create a new Scope that isn't a child or parent of any scope
    pub fn new() -> Self {
        Self(Id::next())
    }

    /// The current Scope in the Runtime. Any subscription created without an
    /// explicit Scope will be under this Scope
    pub fn current() -> Scope {
        RUNTIME.with(|runtime| Scope(runtime.current_scope.get()))
    }

    /// Create a child Scope of this Scope
    pub fn create_child(&self) -> Scope {
        let child = Id::next();
        child.set_parent(self.0);
        Scope(child)
    }

    /// Runs the given closure with this Scope as the current one.
    pub fn enter<T>(&self, f: impl FnOnce() -> T) -> T {
        with_scope(*self, f)
    }

    /// Dispose this Scope, and it will dispose all the subscriptions and child
    /// Scopes of this Scope.
    pub fn dispose(&self) {
        self.0.dispose();
    }
}

/// Runs the given code with the given Scope
pub fn with_scope<T>(scope: Scope, f: impl FnOnce() -> T) -> T {
    let prev_scope = RUNTIME.with(|runtime| runtime.current_scope.replace(scope.0));

    let result = f();

    RUNTIME.with(|runtime| runtime.current_scope.set(prev_scope));

    result
}
