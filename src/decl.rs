//! Bindings declared as data, and the converter names they refer to.

use std::{fmt, rc::Rc};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    binding::{Binding, BindingMode, InvalidMode},
    converter::{DateFormat, DateStyle, Identity, IntText, Not, ToText, ValueConverter},
};

#[derive(Debug, Error)]
pub enum DeclError {
    #[error("unknown converter `{0}`")]
    UnknownConverter(String),

    #[error(transparent)]
    InvalidMode(#[from] InvalidMode),

    #[cfg(feature = "serde")]
    #[error("invalid binding declarations: {0}")]
    Json(#[from] serde_json::Error),
}

/// Named converters that declarations can refer to.
///
/// [`ConverterRegistry::default`] knows `identity`, `text`, `int_text`,
/// `not`, `date_short`, `date_medium`, `date_long` and `date_full`.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: FxHashMap<String, Rc<dyn ValueConverter>>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("converters", &names)
            .finish()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("identity", Identity);
        registry.register("text", ToText);
        registry.register("int_text", IntText);
        registry.register("not", Not);
        registry.register("date_short", DateFormat::new(DateStyle::Short));
        registry.register("date_medium", DateFormat::new(DateStyle::Medium));
        registry.register("date_long", DateFormat::new(DateStyle::Long));
        registry.register("date_full", DateFormat::new(DateStyle::Full));
        registry
    }
}

impl ConverterRegistry {
    /// A registry without the built-in converters.
    pub fn empty() -> Self {
        Self {
            converters: FxHashMap::default(),
        }
    }

    /// Register `converter` under `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, converter: impl ValueConverter + 'static) {
        self.register_shared(name, Rc::new(converter));
    }

    pub fn register_shared(&mut self, name: &str, converter: Rc<dyn ValueConverter>) {
        self.converters.insert(name.to_string(), converter);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn ValueConverter>> {
        self.converters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }
}

/// One binding as written in markup or configuration.
///
/// ```
/// use avalon::{BindingDecl, ConverterRegistry};
///
/// let decl = BindingDecl::new("age", "text").with_converter("text");
/// let binding = decl.resolve(&ConverterRegistry::default()).unwrap();
/// assert_eq!(binding.converter_name(), "text");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingDecl {
    pub source: String,
    pub destination: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub converter: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: BindingMode,
}

impl BindingDecl {
    pub fn new(source: &str, destination: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            converter: None,
            mode: BindingMode::OneWay,
        }
    }

    /// A declaration from loose strings, as entered in a property inspector.
    /// Empty converter and mode strings mean "none" and one-way.
    pub fn from_parts(
        source: &str,
        destination: &str,
        converter: &str,
        mode: &str,
    ) -> Result<Self, DeclError> {
        let converter = converter.trim();
        Ok(Self {
            source: source.to_string(),
            destination: destination.to_string(),
            converter: (!converter.is_empty()).then(|| converter.to_string()),
            mode: mode.parse()?,
        })
    }

    pub fn with_converter(mut self, converter: &str) -> Self {
        self.converter = Some(converter.to_string());
        self
    }

    pub fn with_mode(mut self, mode: BindingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the binding, looking the converter up in `registry`.
    pub fn resolve(&self, registry: &ConverterRegistry) -> Result<Binding, DeclError> {
        let binding = Binding::new(self.source.as_str(), &self.destination).mode(self.mode);
        match &self.converter {
            Some(name) => {
                let converter = registry
                    .get(name)
                    .ok_or_else(|| DeclError::UnknownConverter(name.clone()))?;
                Ok(binding.shared_converter(converter))
            }
            None => Ok(binding),
        }
    }
}

/// Resolve a list of declarations, preserving their order.
pub fn resolve_all(
    decls: &[BindingDecl],
    registry: &ConverterRegistry,
) -> Result<Vec<Binding>, DeclError> {
    decls.iter().map(|decl| decl.resolve(registry)).collect()
}

/// Parse a JSON array of declarations into bindings.
///
/// ```
/// use avalon::{parse_bindings, ConverterRegistry};
///
/// let bindings = parse_bindings(
///     r#"[
///         { "source": "name", "destination": "text" },
///         { "source": "age", "destination": "text", "converter": "int_text", "mode": "two_way" }
///     ]"#,
///     &ConverterRegistry::default(),
/// )
/// .unwrap();
/// assert_eq!(bindings.len(), 2);
/// ```
#[cfg(feature = "serde")]
pub fn parse_bindings(json: &str, registry: &ConverterRegistry) -> Result<Vec<Binding>, DeclError> {
    let decls: Vec<BindingDecl> = serde_json::from_str(json)?;
    resolve_all(&decls, registry)
}
