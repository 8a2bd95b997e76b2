use std::{fmt, rc::Rc, str::FromStr};

use avalon_reactive::Value;

use crate::{
    converter::{ConversionError, ValueConverter},
    path::PropertyPath,
};

/// The destination name that targets a view's own binding context instead of
/// a property of its adapter.
pub const BINDING_CONTEXT: &str = "binding_context";

/// Which way values flow through a [`Binding`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BindingMode {
    /// Source changes are pushed into the destination.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "OneWay"))]
    OneWay,
    /// Additionally, destination edits are written back into the source.
    #[cfg_attr(feature = "serde", serde(alias = "TwoWay"))]
    TwoWay,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown binding mode `{0}`")]
pub struct InvalidMode(pub String);

impl FromStr for BindingMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "one_way" | "OneWay" | "oneway" => Ok(BindingMode::OneWay),
            "two_way" | "TwoWay" | "twoway" => Ok(BindingMode::TwoWay),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

/// A declarative mapping from a source property path to a destination
/// property.
///
/// Bindings are passive descriptors: nothing is observed until a
/// [`BindingContextController`](crate::BindingContextController) attaches
/// them to a root. They are immutable once built and cheap to clone, so the
/// same binding can be shared by many destinations.
///
/// ```
/// use avalon::{Binding, converter::ToText};
///
/// let binding = Binding::new("address.city", "text");
/// let age = Binding::new("age", "text").converter(ToText);
/// assert_eq!(binding.source().segments().len(), 2);
/// assert!(age.has_converter());
/// ```
#[derive(Clone, educe::Educe)]
#[educe(Debug)]
pub struct Binding {
    source: PropertyPath,
    destination: Rc<str>,
    #[educe(Debug(method(fmt_converter)))]
    converter: Option<Rc<dyn ValueConverter>>,
    mode: BindingMode,
}

fn fmt_converter(
    converter: &Option<Rc<dyn ValueConverter>>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match converter {
        Some(converter) => f.write_str(converter.name()),
        None => f.write_str("identity"),
    }
}

impl Binding {
    pub fn new(source: impl Into<PropertyPath>, destination: &str) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            converter: None,
            mode: BindingMode::OneWay,
        }
    }

    /// Convert source values with `converter` before they reach the
    /// destination.
    pub fn converter(self, converter: impl ValueConverter + 'static) -> Self {
        self.shared_converter(Rc::new(converter))
    }

    pub fn shared_converter(mut self, converter: Rc<dyn ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn mode(mut self, mode: BindingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn two_way(self) -> Self {
        self.mode(BindingMode::TwoWay)
    }

    pub fn source(&self) -> &PropertyPath {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn binding_mode(&self) -> BindingMode {
        self.mode
    }

    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    pub fn converter_name(&self) -> &str {
        self.converter
            .as_deref()
            .map_or("identity", |converter| converter.name())
    }

    /// Whether this binding sets the binding context of its view.
    pub fn targets_context(&self) -> bool {
        &*self.destination == BINDING_CONTEXT
    }

    pub(crate) fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match &self.converter {
            Some(converter) => converter.convert(value),
            None => Ok(value.clone()),
        }
    }

    pub(crate) fn convert_back(&self, value: &Value) -> Result<Value, ConversionError> {
        match &self.converter {
            Some(converter) => converter.convert_back(value),
            None => Ok(value.clone()),
        }
    }
}
