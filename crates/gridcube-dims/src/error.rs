//! Error types for dimension configuration, resolution and coordinates.

use std::error::Error;
use std::fmt;

use gridcube_core::FieldError;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`DimsConfig::validate()`](crate::DimsConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `time_dim_mode` is not one of `forecast`, `valid_time`, `raw`.
    UnknownTimeDimMode {
        /// The rejected name.
        name: String,
    },
    /// `level_dim_mode` is not one of `level`, `level_per_type`,
    /// `level_and_type`.
    UnknownLevelDimMode {
        /// The rejected name.
        name: String,
    },
    /// A key appears in two option lists that exclude each other.
    ConflictingKey {
        /// The offending key.
        key: String,
        /// First option holding the key.
        first: &'static str,
        /// Second option holding the key.
        second: &'static str,
    },
    /// An option was combined with `fixed_dims`.
    FixedDimsExclusive {
        /// The option that cannot be combined.
        option: &'static str,
    },
    /// `variable_key` is empty.
    EmptyVariableKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTimeDimMode { name } => write!(f, "unknown time_dim_mode={name}"),
            Self::UnknownLevelDimMode { name } => write!(f, "unknown level_dim_mode={name}"),
            Self::ConflictingKey { key, first, second } => {
                write!(f, "key {key} cannot be in {first} and {second}")
            }
            Self::FixedDimsExclusive { option } => {
                write!(f, "{option} cannot be used with fixed_dims")
            }
            Self::EmptyVariableKey => write!(f, "variable_key must not be empty"),
        }
    }
}

impl Error for ConfigError {}

// ── CoordError ─────────────────────────────────────────────────────

/// A coordinate value could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordError {
    /// Name of the coordinate.
    pub name: String,
    /// The decoding failure.
    pub source: FieldError,
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coordinate {}: {}", self.name, self.source)
    }
}

impl Error for CoordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

// ── DimError ───────────────────────────────────────────────────────

/// Errors raised while building or querying [`Dims`](crate::Dims).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimError {
    /// Configuration validation failed.
    Config(ConfigError),
    /// Coordinate decoding failed.
    Coord(CoordError),
    /// Variable-related keys were found among the dimensions.
    VariableKeyAsDimension {
        /// The keys that collide with the variable.
        keys: Vec<String>,
        /// The configured variable key.
        variable_key: String,
    },
    /// The level-type key has no value on the first field.
    LevelTypeMissing {
        /// The level-type metadata key.
        key: String,
    },
    /// A configured metadata key could not be parsed.
    Field(FieldError),
}

impl fmt::Display for DimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Coord(e) => write!(f, "{e}"),
            Self::VariableKeyAsDimension { keys, variable_key } => write!(
                f,
                "variable-related keys {keys:?} cannot be dimensions. Such a key must be \
                 specified as the variable_key. The variable_key can only be set to a \
                 single key, its current value is \"{variable_key}\""
            ),
            Self::LevelTypeMissing { key } => write!(f, "{key} not found in metadata"),
            Self::Field(e) => write!(f, "{e}"),
        }
    }
}

impl Error for DimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Coord(e) => Some(e),
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for DimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CoordError> for DimError {
    fn from(e: CoordError) -> Self {
        Self::Coord(e)
    }
}

impl From<FieldError> for DimError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}
