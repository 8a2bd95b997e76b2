use avalon_reactive::{Notifier, ObjectRef, PropertyError, Value};

/// The boundary through which the engine reads and writes the state of one
/// kind of destination, usually a UI control.
///
/// The engine never assumes a concrete control type; it only calls through
/// this trait.
pub trait Adapter {
    fn property(&self, name: &str) -> Option<Value>;

    fn set_property(&self, name: &str, value: Value) -> Result<(), PropertyError>;

    /// The channel on which the destination announces its own edits, keyed
    /// by property name. Two-way bindings write these edits back to the
    /// source. Destinations without user edits return `None`.
    fn edits(&self) -> Option<&Notifier> {
        None
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Uses an observable object as a binding destination.
///
/// The object's own notifier doubles as its edit channel, so two-way
/// bindings between two objects keep both in sync.
#[derive(Clone)]
pub struct ObjectAdapter {
    object: ObjectRef,
}

impl std::fmt::Debug for ObjectAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectAdapter")
            .field(&self.object.type_name())
            .finish()
    }
}

impl ObjectAdapter {
    pub fn new(object: ObjectRef) -> Self {
        Self { object }
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }
}

impl Adapter for ObjectAdapter {
    fn property(&self, name: &str) -> Option<Value> {
        self.object.property(name)
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), PropertyError> {
        self.object.set_property(name, value)
    }

    fn edits(&self) -> Option<&Notifier> {
        Some(self.object.notifier())
    }

    fn type_name(&self) -> &'static str {
        self.object.type_name()
    }
}
