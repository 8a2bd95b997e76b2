use thiserror::Error;

/// Errors raised when reading or writing a property on an observable object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The object has no property with this name.
    #[error("no property `{property}` on {target}")]
    Missing {
        property: String,
        target: &'static str,
    },

    /// The property exists but cannot be written.
    #[error("property `{property}` on {target} is read-only")]
    ReadOnly {
        property: String,
        target: &'static str,
    },

    /// The property exists but does not accept values of this kind.
    #[error("property `{property}` expects {expected}, got {found}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl PropertyError {
    pub fn missing(property: &str, target: &'static str) -> Self {
        PropertyError::Missing {
            property: property.to_string(),
            target,
        }
    }

    pub fn read_only(property: &str, target: &'static str) -> Self {
        PropertyError::ReadOnly {
            property: property.to_string(),
            target,
        }
    }

    pub fn type_mismatch(property: &str, expected: &'static str, found: &'static str) -> Self {
        PropertyError::TypeMismatch {
            property: property.to_string(),
            expected,
            found,
        }
    }
}
