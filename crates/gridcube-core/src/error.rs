//! Error types for field access and metadata decoding.

use std::error::Error;
use std::fmt;

/// Errors raised by the field-list layer and the date/step helpers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// A metadata key carried a type suffix that is not recognised.
    UnsupportedKeyType {
        /// The full key as written (e.g. `"level:x"`).
        key: String,
        /// The offending suffix.
        suffix: String,
    },
    /// A field's value count differs from the first field's.
    ShapeMismatch {
        /// Position of the offending field in the list.
        index: usize,
        /// Value count of the first field.
        expected: usize,
        /// Value count of the offending field.
        actual: usize,
    },
    /// The operation requires at least one field.
    EmptyFieldList,
    /// A date/datetime value could not be decoded.
    InvalidDate {
        /// The raw value.
        value: String,
    },
    /// A step value does not match any supported encoding.
    UnsupportedStep {
        /// The raw value.
        value: String,
    },
    /// A step value carries an unknown unit letter.
    UnsupportedStepUnits {
        /// The raw value.
        value: String,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedKeyType { key, suffix } => {
                write!(f, "key type '{suffix}' not supported in key '{key}'")
            }
            Self::ShapeMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "field[{index}] has {actual} values, expected {expected}"
            ),
            Self::EmptyFieldList => write!(f, "field list is empty"),
            Self::InvalidDate { value } => write!(f, "cannot decode datetime from '{value}'"),
            Self::UnsupportedStep { value } => write!(f, "unsupported step encoding: {value}"),
            Self::UnsupportedStepUnits { value } => {
                write!(f, "unsupported step units in step: {value}")
            }
        }
    }
}

impl Error for FieldError {}
