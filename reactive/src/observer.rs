use std::{
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    disposable::Disposable,
    error::PropertyError,
    notifier::Subscription,
    observable::Observable,
    value::{ObjectRef, Value},
};

/// Watches one property of one object.
///
/// The observer does not keep its target alive. It owns exactly one
/// subscription on the target's notifier, created under the current
/// [`Scope`](crate::Scope).
pub struct PropertyObserver {
    target: Weak<dyn Observable>,
    target_name: &'static str,
    property: Rc<str>,
    subscription: Subscription,
}

impl fmt::Debug for PropertyObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyObserver")
            .field("target", &self.target_name)
            .field("property", &self.property)
            .field("disposed", &self.subscription.is_disposed())
            .finish()
    }
}

impl PropertyObserver {
    /// Start observing `property` on `target`.
    ///
    /// `on_change` runs synchronously with the new value every time the
    /// target notifies a change of `property`. Fails without subscribing if
    /// the target has no such property.
    pub fn observe(
        target: &ObjectRef,
        property: &str,
        on_change: impl Fn(&Value) + 'static,
    ) -> Result<Self, PropertyError> {
        if target.property(property).is_none() {
            return Err(PropertyError::missing(property, target.type_name()));
        }
        let subscription = target.notifier().subscribe(property, on_change);
        Ok(Self {
            target: Rc::downgrade(target),
            target_name: target.type_name(),
            property: property.into(),
            subscription,
        })
    }

    /// The present value of the property, `None` if the target is gone.
    pub fn current_value(&self) -> Option<Value> {
        self.target()
            .and_then(|target| target.property(&self.property))
    }

    pub fn target(&self) -> Option<ObjectRef> {
        self.target.upgrade()
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn is_disposed(&self) -> bool {
        self.subscription.is_disposed()
    }

    /// Write through to the observed property.
    pub fn write(&self, value: Value) -> Result<(), PropertyError> {
        match self.target() {
            Some(target) => target.set_property(&self.property, value),
            None => Err(PropertyError::missing(&self.property, self.target_name)),
        }
    }
}

impl Disposable for PropertyObserver {
    fn dispose(&self) {
        self.subscription.dispose();
    }
}
