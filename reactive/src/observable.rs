use std::fmt;

use crate::{
    error::PropertyError,
    notifier::{FxIndexMap, Notifier},
    value::Value,
};

/// An object whose named properties can be read, written and observed.
///
/// Implementors call [`Notifier::notify`] on their own notifier whenever one of
/// their properties changes. Typed view-models usually forward `property` and
/// `set_property` to a [`PropertyTable`]; fully dynamic ones use
/// [`Model`](crate::Model).
pub trait Observable: 'static {
    /// The current value of `name`, or `None` if there is no such property.
    fn property(&self, name: &str) -> Option<Value>;

    /// Write `value` into `name`. Read-only by default.
    fn set_property(&self, name: &str, value: Value) -> Result<(), PropertyError> {
        let _ = value;
        if self.property(name).is_some() {
            Err(PropertyError::read_only(name, self.type_name()))
        } else {
            Err(PropertyError::missing(name, self.type_name()))
        }
    }

    /// The change channel of this object.
    fn notifier(&self) -> &Notifier;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub type Getter<T> = fn(&T) -> Value;
pub type Setter<T> = fn(&T, Value) -> Result<(), PropertyError>;

struct Accessor<T> {
    get: Getter<T>,
    set: Option<Setter<T>>,
}

/// The properties of one view-model type, registered once per type.
///
/// ```
/// use std::{cell::RefCell, sync::LazyLock};
/// use avalon_reactive::{Notifier, Observable, PropertyError, PropertyTable, Value};
///
/// struct Counter {
///     count: RefCell<i64>,
///     notifier: Notifier,
/// }
///
/// static PROPERTIES: LazyLock<PropertyTable<Counter>> = LazyLock::new(|| {
///     PropertyTable::<Counter>::new().readonly("count", |c| Value::Int(*c.count.borrow()))
/// });
///
/// impl Observable for Counter {
///     fn property(&self, name: &str) -> Option<Value> {
///         PROPERTIES.get(self, name)
///     }
///
///     fn set_property(&self, name: &str, value: Value) -> Result<(), PropertyError> {
///         PROPERTIES.set(self, name, value)
///     }
///
///     fn notifier(&self) -> &Notifier {
///         &self.notifier
///     }
/// }
/// ```
pub struct PropertyTable<T> {
    accessors: FxIndexMap<&'static str, Accessor<T>>,
}

impl<T> Default for PropertyTable<T> {
    fn default() -> Self {
        Self {
            accessors: Default::default(),
        }
    }
}

impl<T> fmt::Debug for PropertyTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.accessors.keys()).finish()
    }
}

impl<T: Observable> PropertyTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property that can only be read.
    pub fn readonly(mut self, name: &'static str, get: Getter<T>) -> Self {
        self.accessors.insert(name, Accessor { get, set: None });
        self
    }

    /// Register a property that can be read and written. The setter is
    /// responsible for notifying the change.
    pub fn readwrite(mut self, name: &'static str, get: Getter<T>, set: Setter<T>) -> Self {
        self.accessors.insert(
            name,
            Accessor {
                get,
                set: Some(set),
            },
        );
        self
    }

    pub fn get(&self, target: &T, name: &str) -> Option<Value> {
        self.accessors.get(name).map(|accessor| (accessor.get)(target))
    }

    pub fn set(&self, target: &T, name: &str, value: Value) -> Result<(), PropertyError> {
        match self.accessors.get(name) {
            Some(Accessor { set: Some(set), .. }) => set(target, value),
            Some(_) => Err(PropertyError::read_only(name, target.type_name())),
            None => Err(PropertyError::missing(name, target.type_name())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.accessors.keys().copied()
    }
}
