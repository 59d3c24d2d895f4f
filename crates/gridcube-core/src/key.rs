//! Typed metadata keys (`"level:l"`, `"param:s"`).

use crate::error::FieldError;
use crate::value::Value;

/// Requested type of a metadata value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Return the value as stored.
    Native,
    /// Convert to a string (`:s`, `:str`).
    Str,
    /// Convert to an integer (`:l`, `:int`).
    Int,
    /// Convert to a float (`:d`, `:float`).
    Float,
}

impl KeyType {
    /// Parse a key-type suffix. The empty suffix means [`KeyType::Native`].
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" => Some(Self::Native),
            "s" | "str" => Some(Self::Str),
            "l" | "int" => Some(Self::Int),
            "d" | "float" => Some(Self::Float),
            _ => None,
        }
    }

    /// Convert a value to this type. Failed conversions yield `None`.
    pub fn cast(self, value: Value) -> Option<Value> {
        match self {
            Self::Native => Some(value),
            Self::Str => Some(Value::Str(value.to_string())),
            Self::Int => value.as_i64().map(Value::Int),
            Self::Float => value.as_f64().map(Value::Float),
        }
    }
}

/// A metadata key with an optional type suffix.
///
/// # Examples
///
/// ```
/// use gridcube_core::{KeyType, MetadataKey};
///
/// let key = MetadataKey::parse("levelist:l").unwrap();
/// assert_eq!(key.name, "levelist");
/// assert_eq!(key.ty, KeyType::Int);
/// assert!(MetadataKey::parse("levelist:q").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetadataKey {
    /// Key name without the suffix.
    pub name: String,
    /// Requested value type.
    pub ty: KeyType,
}

impl MetadataKey {
    /// Split `key` into name and type suffix.
    pub fn parse(key: &str) -> Result<Self, FieldError> {
        let (name, suffix) = match key.split_once(':') {
            Some((name, suffix)) => (name, suffix),
            None => (key, ""),
        };
        let ty = KeyType::from_suffix(suffix).ok_or_else(|| FieldError::UnsupportedKeyType {
            key: key.to_string(),
            suffix: suffix.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            ty,
        })
    }
}
