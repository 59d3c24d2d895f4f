//! gridcube: labelled hypercube tensors over gridded weather-model fields.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the gridcube sub-crates and adds the end-to-end pipeline: resolve the
//! dimensions of a field list, split it by variable and build one tensor
//! per variable.
//!
//! # Quick start
//!
//! ```rust
//! use gridcube::prelude::*;
//! use gridcube_test_utils::ds_date_sfc_pl;
//!
//! let config = DimsConfig {
//!     time_dim_mode: TimeDimMode::Raw,
//!     ..Default::default()
//! };
//! let out = build_variable_tensors(&config, ds_date_sfc_pl()).unwrap();
//! assert_eq!(out.dims.active_dim_keys(), vec!["date", "levelist"]);
//!
//! // surface variables have no level dimension
//! let t2m = &out.variables[&Value::from("2t")].tensor;
//! assert_eq!(t2m.user_dims().keys().collect::<Vec<_>>(), vec!["date"]);
//!
//! let t = &out.variables[&Value::from("t")].tensor;
//! let t850 = t.sel(&[("levelist", Selector::from(850))]).unwrap();
//! assert_eq!(t850.user_shape().as_slice(), &[2, 1]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gridcube-core` | metadata values, field traits, remapping, dates |
//! | [`dims`] | `gridcube-dims` | dimension configuration, selection, coordinates |
//! | [`tensor`] | `gridcube-tensor` | tensors, selection, hypercube check |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
mod split;

pub use error::Error;
pub use split::{build_variable_tensors, Variable, VariableTensors};

/// Core types and traits (`gridcube-core`).
///
/// [`types::Value`], the [`types::Field`] / [`types::FieldList`] traits,
/// the in-memory [`types::DictFieldList`] and GRIB date helpers.
pub use gridcube_core as types;

/// Dimension selection and coordinates (`gridcube-dims`).
pub use gridcube_dims as dims;

/// Tensor views and selection (`gridcube-tensor`).
pub use gridcube_tensor as tensor;

/// Common imports for typical gridcube usage.
///
/// ```rust
/// use gridcube::prelude::*;
/// ```
pub mod prelude {
    // Pipeline
    pub use crate::{build_variable_tensors, Error, Variable, VariableTensors};

    // Core types and traits
    pub use gridcube_core::{DictField, DictFieldList, Field, FieldList, Remapped, Value};

    // Dimensions
    pub use gridcube_dims::{Coord, Dims, DimsConfig, LevelDimMode, TimeDimMode};

    // Tensors
    pub use gridcube_tensor::{
        ArrayTensor, CubeCoords, FieldListTensor, Indexer, Selector, Slice, Tensor, TensorOptions,
    };
}
