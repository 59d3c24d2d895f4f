//! Dimension and coordinate inference for gridcube field lists.
//!
//! Given a field list with arbitrary metadata, [`Dims`] decides which
//! metadata keys become array dimensions and in what order, and turns the
//! realised coordinate values into typed [`Coord`]s.
//!
//! # Policy
//!
//! - [`DimsConfig`]: variable key, requested/dropped/ensured/fixed keys,
//!   squeeze, composite-key templates.
//! - [`TimeDimMode`]: forecast (reference time + step), valid time, or raw
//!   date/time/step.
//! - [`LevelDimMode`]: numeric level, one level dimension per level type, or
//!   concatenated level and type.
//!
//! # Resolution
//!
//! Candidates are declared in a fixed order and resolved in a single pass;
//! see [`dims`] for the exact order and tie-break.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compound;
pub mod config;
pub mod coord;
pub mod dim;
pub mod dims;
pub mod error;
pub mod keys;
pub mod mode;

pub use compound::CompoundKey;
pub use config::{DimRoles, DimsConfig, LevelDimMode, TimeDimMode};
pub use coord::{Coord, CoordKind, CoordValue};
pub use dim::{Dim, DimKind};
pub use dims::{DimOrigin, Dims};
pub use error::{ConfigError, CoordError, DimError};
pub use keys::{KeyGroup, KeyRegistry};
pub use mode::ModeDims;
