//! Hypercube tensor views over gridcube field lists.
//!
//! A [`FieldListTensor`] arranges a field list into a labelled array: the
//! leading user dimensions are metadata keys with sorted distinct values,
//! the trailing dimensions are the field grid. Construction checks that
//! the list holds exactly one field per coordinate tuple and reports the
//! first offending field otherwise.
//!
//! Flat field positions and coordinate tuples are related by
//! [`coords_to_index`] / [`index_to_coords`], last dimension fastest.
//!
//! # Selection
//!
//! [`Tensor::index`] and [`Tensor::isel`] select by position,
//! [`Tensor::sel`] by coordinate label. Selection keeps every user
//! dimension (a scalar index leaves length one) and never touches the
//! field grid.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod check;
pub mod coords;
pub mod diff;
pub mod error;
pub mod fieldlist;
pub mod grid;
pub mod index;
pub mod selection;
pub mod tensor;

pub use array::ArrayTensor;
pub use check::check_hypercube;
pub use coords::CubeCoords;
pub use diff::{list_to_str, DictDiff, ListDiff};
pub use error::{FirstDifference, HypercubeError, NeighbourDiff, TensorError};
pub use fieldlist::{FieldListTensor, TensorOptions, ValidDatetime};
pub use grid::FieldGrid;
pub use index::{coords_to_index, index_to_coords, product_indices, CoordIndex, Shape};
pub use selection::{Indexer, Selector, Slice};
pub use tensor::Tensor;
