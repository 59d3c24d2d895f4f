//! Error types for tensor construction and selection.

use std::error::Error;
use std::fmt;

use gridcube_core::{FieldError, Value};
use indexmap::IndexMap;

// ── HypercubeError ─────────────────────────────────────────────────

/// The first field whose metadata disagrees with its expected coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirstDifference {
    /// Position of the field in the source list.
    pub index: usize,
    /// Dimension whose value differs.
    pub dim: String,
    /// Coordinate value expected at `index`.
    pub expected: Value,
    /// Metadata value found, `None` when the key is absent.
    pub actual: Option<Value>,
}

/// Metadata differences between the first differing field and a neighbour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighbourDiff {
    /// Position of the first differing field.
    pub index: usize,
    /// Position of the neighbour it was compared with.
    pub other: usize,
    /// Rendered differences per group (`"dims"`, `"namespace=mars"`, ...).
    pub diffs: IndexMap<String, String>,
}

/// The source field list does not form a full hypercube over the user
/// dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HypercubeError {
    /// Field count implied by the user shape.
    pub expected: usize,
    /// Actual field count.
    pub actual: usize,
    /// One line per dimension: name and (elided) values.
    pub dims: Vec<String>,
    /// First deviating field, when one was found.
    pub first_difference: Option<FirstDifference>,
    /// Comparison with the neighbour of the first deviating field.
    pub neighbour: Option<NeighbourDiff>,
    /// Rendered metadata of the first deviating field per group.
    pub metadata: IndexMap<String, String>,
}

impl fmt::Display for HypercubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Input does not form a full hypercube. Expected number of fields based on \
             the dimensions does not match actual number of fields: {} != {}.\n\
             Dimensions: \n {}",
            self.expected,
            self.actual,
            self.dims.join("\n")
        )?;
        if let Some(d) = &self.first_difference {
            let actual = d
                .actual
                .as_ref()
                .map_or_else(|| "None".to_string(), ToString::to_string);
            write!(
                f,
                "\nFirst difference from the expected dimensions occurs at field[{}] for \
                 dimension \"{}\". Expected {} got {}.",
                d.index, d.dim, d.expected, actual
            )?;
        }
        if let Some(n) = &self.neighbour {
            write!(
                f,
                "\nComparing field[{}] with field[{}], the following metadata difference \
                 was found:\n",
                n.index, n.other
            )?;
            for (k, v) in &n.diffs {
                writeln!(f, "{k}:\n {v}")?;
            }
        }
        if let Some(d) = &self.first_difference {
            write!(f, "\nField[{}] metadata:\n", d.index)?;
            for (k, v) in &self.metadata {
                writeln!(f, "{k}:\n {v}")?;
            }
        }
        Ok(())
    }
}

impl Error for HypercubeError {}

// ── TensorError ────────────────────────────────────────────────────

/// Errors raised while building or slicing a tensor.
#[derive(Clone, Debug, PartialEq)]
pub enum TensorError {
    /// Field-list access failed.
    Field(FieldError),
    /// The hypercube law does not hold.
    Hypercube(Box<HypercubeError>),
    /// A selection named a dimension the tensor does not have.
    UnknownDimension {
        /// The requested name.
        name: String,
    },
    /// A positional index is outside its dimension.
    IndexOutOfBounds {
        /// Dimension name.
        dim: String,
        /// The requested index, before negative wrap-around.
        index: isize,
        /// Dimension length.
        len: usize,
    },
    /// More indexers than user dimensions.
    TooManyIndexers {
        /// Number of indexers given.
        got: usize,
        /// Number of user dimensions.
        ndim: usize,
    },
    /// An ellipsis appeared anywhere but last.
    MisplacedEllipsis {
        /// Position of the ellipsis.
        position: usize,
    },
    /// A slice step of zero.
    ZeroSliceStep,
    /// A tensor's shape does not match its coordinates or data.
    ShapeMismatch {
        /// The shape found.
        shape: Vec<usize>,
        /// The shape expected.
        expected: Vec<usize>,
    },
}

impl fmt::Display for TensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(e) => write!(f, "field list: {e}"),
            Self::Hypercube(e) => write!(f, "{e}"),
            Self::UnknownDimension { name } => write!(f, "unknown dimension {name}"),
            Self::IndexOutOfBounds { dim, index, len } => {
                write!(f, "index {index} out of bounds for dimension {dim} of size {len}")
            }
            Self::TooManyIndexers { got, ndim } => {
                write!(f, "too many indexers: {got} given for {ndim} dimensions")
            }
            Self::MisplacedEllipsis { position } => {
                write!(f, "ellipsis is only supported last, found at {position}")
            }
            Self::ZeroSliceStep => write!(f, "slice step cannot be zero"),
            Self::ShapeMismatch { shape, expected } => {
                write!(f, "shape={shape:?} differs from expected shape={expected:?}")
            }
        }
    }
}

impl Error for TensorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            Self::Hypercube(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<FieldError> for TensorError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl From<HypercubeError> for TensorError {
    fn from(e: HypercubeError) -> Self {
        Self::Hypercube(Box::new(e))
    }
}
