//! The facade error type.

use std::error::Error as StdError;
use std::fmt;

use gridcube_dims::DimError;
use gridcube_tensor::TensorError;

/// Errors raised by [`build_variable_tensors`](crate::build_variable_tensors).
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Dimension selection failed.
    Dims(DimError),
    /// Tensor construction failed.
    Tensor(TensorError),
    /// No field carries the variable key.
    NoVariables {
        /// The configured variable key.
        variable_key: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dims(e) => write!(f, "dimensions: {e}"),
            Self::Tensor(e) => write!(f, "tensor: {e}"),
            Self::NoVariables { variable_key } => {
                write!(f, "no field has a value for variable_key={variable_key}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Dims(e) => Some(e),
            Self::Tensor(e) => Some(e),
            Self::NoVariables { .. } => None,
        }
    }
}

impl From<DimError> for Error {
    fn from(e: DimError) -> Self {
        Self::Dims(e)
    }
}

impl From<TensorError> for Error {
    fn from(e: TensorError) -> Self {
        Self::Tensor(e)
    }
}
