//! Value converters applied between a binding's source and its destination.

use avalon_reactive::Value;
use thiserror::Error;

/// Why a converter could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("expected {expected}, got {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot parse `{text}` as {expected}")]
    Parse { text: String, expected: &'static str },

    #[error("converting back to the source is not supported")]
    Unsupported,
}

impl ConversionError {
    pub fn unexpected(expected: &'static str, found: &Value) -> Self {
        ConversionError::UnexpectedValue {
            expected,
            found: found.kind(),
        }
    }
}

/// A pure mapping from a source value to a destination value.
///
/// `convert` runs synchronously on every propagation, including the initial
/// one, and must accept [`Value::Null`]: the engine passes absent values
/// through unchanged. Converters are stateless and shared freely.
pub trait ValueConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError>;

    /// The inverse mapping, used by two-way bindings.
    fn convert_back(&self, value: &Value) -> Result<Value, ConversionError> {
        let _ = value;
        Err(ConversionError::Unsupported)
    }

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Passes values through untouched. The default when a binding has no
/// converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ValueConverter for Identity {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        Ok(value.clone())
    }

    fn convert_back(&self, value: &Value) -> Result<Value, ConversionError> {
        Ok(value.clone())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Ignores the source and always produces the same value.
#[derive(Debug, Clone)]
pub struct Constant(pub Value);

impl ValueConverter for Constant {
    fn convert(&self, _value: &Value) -> Result<Value, ConversionError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Formats scalars as text. Null becomes the empty string.
///
/// Converting back reads integers, floats and booleans out of the text and
/// keeps anything else as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToText;

impl ValueConverter for ToText {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        let text = match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => return Ok(Value::Text(s.clone())),
            Value::Date(d) => d.to_rfc3339(),
            Value::Object(_) | Value::List(_) => {
                return Err(ConversionError::unexpected("a scalar", value));
            }
        };
        Ok(Value::from(text))
    }

    fn convert_back(&self, value: &Value) -> Result<Value, ConversionError> {
        let text = match value {
            Value::Null => return Ok(Value::Null),
            Value::Text(text) => text,
            other => return Err(ConversionError::unexpected("text", other)),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Value::Int(i));
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Ok(Value::Float(f));
        }
        match trimmed {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Ok(Value::Text(text.clone())),
        }
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// An integer shown as editable text.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntText;

impl ValueConverter for IntText {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Null => Ok(Value::from("")),
            Value::Int(i) => Ok(Value::from(i.to_string())),
            other => Err(ConversionError::unexpected("int", other)),
        }
    }

    fn convert_back(&self, value: &Value) -> Result<Value, ConversionError> {
        let text = value
            .as_str()
            .ok_or_else(|| ConversionError::unexpected("text", value))?;
        text.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ConversionError::Parse {
                text: text.to_string(),
                expected: "int",
            })
    }

    fn name(&self) -> &str {
        "int_text"
    }
}

/// Boolean negation; null counts as false.
#[derive(Debug, Clone, Copy, Default)]
pub struct Not;

impl ValueConverter for Not {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Null => Ok(Value::Bool(true)),
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(ConversionError::unexpected("bool", other)),
        }
    }

    fn convert_back(&self, value: &Value) -> Result<Value, ConversionError> {
        self.convert(value)
    }

    fn name(&self) -> &str {
        "not"
    }
}

/// How much of a date [`DateFormat`] spells out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateStyle {
    /// `1/1/70`
    Short,
    /// `Jan 1, 1970`
    Medium,
    /// `January 1, 1970`
    Long,
    /// `Thursday, January 1, 1970`
    Full,
}

impl DateStyle {
    fn pattern(self) -> &'static str {
        match self {
            DateStyle::Short => "%-m/%-d/%y",
            DateStyle::Medium => "%b %-d, %Y",
            DateStyle::Long => "%B %-d, %Y",
            DateStyle::Full => "%A, %B %-d, %Y",
        }
    }
}

/// Formats dates as US-English text. Null becomes the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pub style: DateStyle,
}

impl DateFormat {
    pub fn new(style: DateStyle) -> Self {
        Self { style }
    }
}

impl ValueConverter for DateFormat {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Null => Ok(Value::from("")),
            Value::Date(date) => Ok(Value::from(date.format(self.style.pattern()).to_string())),
            other => Err(ConversionError::unexpected("date", other)),
        }
    }

    fn name(&self) -> &str {
        match self.style {
            DateStyle::Short => "date_short",
            DateStyle::Medium => "date_medium",
            DateStyle::Long => "date_long",
            DateStyle::Full => "date_full",
        }
    }
}

type ConvertFn = Box<dyn Fn(&Value) -> Result<Value, ConversionError>>;

/// A converter built from closures.
///
/// ```
/// use avalon::converter::{ConversionError, FnConverter, ValueConverter};
/// use avalon::reactive::Value;
///
/// let age = FnConverter::new("age", |value| match value {
///     Value::Int(years) => Ok(Value::from(format!("{years} years"))),
///     other => Err(ConversionError::unexpected("int", other)),
/// });
/// assert_eq!(age.convert(&Value::Int(22)).unwrap(), Value::from("22 years"));
/// ```
#[derive(educe::Educe)]
#[educe(Debug)]
pub struct FnConverter {
    name: String,
    #[educe(Debug(ignore))]
    forward: ConvertFn,
    #[educe(Debug(ignore))]
    back: Option<ConvertFn>,
}

impl FnConverter {
    pub fn new(
        name: impl Into<String>,
        forward: impl Fn(&Value) -> Result<Value, ConversionError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            forward: Box::new(forward),
            back: None,
        }
    }

    pub fn with_back(
        mut self,
        back: impl Fn(&Value) -> Result<Value, ConversionError> + 'static,
    ) -> Self {
        self.back = Some(Box::new(back));
        self
    }
}

impl ValueConverter for FnConverter {
    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        (self.forward)(value)
    }

    fn convert_back(&self, value: &Value) -> Result<Value, ConversionError> {
        match &self.back {
            Some(back) => back(value),
            None => Err(ConversionError::Unsupported),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
