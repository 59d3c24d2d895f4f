//! Core types and traits for the gridcube data-cube library.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! abstractions the dimension and tensor layers consume: scalar metadata
//! values, the field and field-list traits, typed metadata keys,
//! composite-key remapping and GRIB date/step decoding.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dates;
pub mod error;
pub mod field;
pub mod key;
pub mod memory;
pub mod remapping;
pub mod value;

pub use error::FieldError;
pub use field::{Field, FieldList};
pub use key::{KeyType, MetadataKey};
pub use memory::{DictField, DictFieldList};
pub use remapping::{Patch, Remapped, Remapping};
pub use value::Value;
