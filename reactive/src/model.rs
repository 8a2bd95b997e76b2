use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    error::PropertyError,
    notifier::{FxIndexMap, Notifier},
    observable::Observable,
    value::Value,
};

/// A view-model whose properties are a string-keyed table.
///
/// For view-models that are only known at runtime. Every [`Model::set`] is
/// a discrete mutation and notifies its subscribers, even if the value did
/// not change.
#[derive(Default)]
pub struct Model {
    values: RefCell<FxIndexMap<Rc<str>, Value>>,
    notifier: Notifier,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.borrow().iter()).finish()
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style initial property.
    pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
        self.values.borrow_mut().insert(name.into(), value.into());
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(Rc::new(self))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.borrow().get(name).cloned()
    }

    /// Set `name`, adding the property if it does not exist yet.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        self.values.borrow_mut().insert(name.into(), value.clone());
        self.notifier.notify(name, &value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }
}

impl Observable for Model {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name)
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), PropertyError> {
        self.set(name, value);
        Ok(())
    }

    fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn type_name(&self) -> &'static str {
        "Model"
    }
}
