//! The [`Tensor`] trait: labelled user dimensions over a per-field grid.

use indexmap::IndexMap;
use ndarray::ArrayD;

use crate::array::ArrayTensor;
use crate::coords::CubeCoords;
use crate::error::TensorError;
use crate::grid::FieldGrid;
use crate::index::Shape;
use crate::selection::{Indexer, Selector};

/// A labelled array whose leading (user) dimensions index fields and
/// whose trailing dimensions are the field grid.
///
/// Implementors provide coordinates, the grid, the stored shape and
/// positional subsetting. Selection by position or label is built on
/// [`subset`](Self::subset). Every selection returns a new tensor.
pub trait Tensor: Sized {
    /// User coordinates in dimension order.
    fn user_coords(&self) -> &CubeCoords;

    /// Grid shared by every field.
    fn field_grid(&self) -> &FieldGrid;

    /// Shape of the stored data.
    fn full_shape(&self) -> Shape;

    /// Retain `positions[d]` along each user dimension `d`.
    ///
    /// `positions` has one entry per user dimension. Coordinates are
    /// subset per dimension; the retained fields are the cartesian
    /// product of the positions, first dimension slowest.
    fn subset(&self, positions: &[Vec<usize>]) -> Result<Self, TensorError>;

    /// Materialize the data as an array of [`full_shape`](Self::full_shape).
    fn to_array(&self) -> Result<ArrayD<f64>, TensorError>;

    /// Length of each user dimension.
    fn user_shape(&self) -> Shape {
        self.user_coords().shape()
    }

    /// Shape of one field.
    fn field_shape(&self) -> Shape {
        self.field_grid().shape()
    }

    /// User dimension name to length.
    fn user_dims(&self) -> IndexMap<String, usize> {
        self.user_coords().dims()
    }

    /// Field dimension name to length.
    fn field_dims(&self) -> &IndexMap<String, usize> {
        self.field_grid().dims()
    }

    /// User then field dimensions.
    fn full_dims(&self) -> IndexMap<String, usize> {
        let mut dims = self.user_dims();
        dims.extend(self.field_dims().iter().map(|(k, v)| (k.clone(), *v)));
        dims
    }

    /// Verify the stored shape against the coordinates and the grid.
    fn check_shape(&self) -> Result<(), TensorError> {
        let full = self.full_shape();
        let mut expected = self.user_shape();
        expected.extend(self.field_shape());
        if full != expected {
            return Err(TensorError::ShapeMismatch {
                shape: full.to_vec(),
                expected: expected.to_vec(),
            });
        }
        let mut deduced: Shape = self.user_dims().values().copied().collect();
        deduced.extend(self.field_dims().values().copied());
        if deduced != full {
            return Err(TensorError::ShapeMismatch {
                shape: full.to_vec(),
                expected: deduced.to_vec(),
            });
        }
        Ok(())
    }

    /// Positional selection over the user dimensions.
    ///
    /// Missing trailing indexers select everything; a trailing
    /// [`Indexer::Ellipsis`] is ignored.
    ///
    /// # Errors
    ///
    /// [`TensorError::TooManyIndexers`] when more indexers than user
    /// dimensions are given, [`TensorError::MisplacedEllipsis`] for an
    /// ellipsis before the end, and the per-indexer bounds errors.
    fn index(&self, indexers: &[Indexer]) -> Result<Self, TensorError> {
        let indexers = Indexer::normalize(indexers, self.user_coords().len())?;
        let positions = self
            .user_coords()
            .iter()
            .zip(&indexers)
            .map(|((name, values), ix)| ix.positions(name, values.len()))
            .collect::<Result<Vec<_>, _>>()?;
        self.subset(&positions)
    }

    /// Label selection: keep the positions whose coordinate matches.
    ///
    /// Unnamed dimensions are kept whole. A selector with no match yields
    /// an empty dimension.
    fn sel(&self, labels: &[(&str, Selector)]) -> Result<Self, TensorError> {
        let coords = self.user_coords();
        let mut positions: Vec<Vec<usize>> =
            coords.iter().map(|(_, v)| (0..v.len()).collect()).collect();
        for (name, selector) in labels {
            let d = coords
                .position(name)
                .ok_or_else(|| TensorError::UnknownDimension {
                    name: name.to_string(),
                })?;
            let values = coords.get(name).unwrap_or_default();
            positions[d] = selector.positions(values);
        }
        self.subset(&positions)
    }

    /// Positional selection by dimension name.
    fn isel(&self, indexers: &[(&str, Indexer)]) -> Result<Self, TensorError> {
        let coords = self.user_coords();
        let mut by_dim = vec![Indexer::all(); coords.len()];
        for (name, ix) in indexers {
            let d = coords
                .position(name)
                .ok_or_else(|| TensorError::UnknownDimension {
                    name: name.to_string(),
                })?;
            by_dim[d] = ix.clone();
        }
        self.index(&by_dim)
    }

    /// Detach into an [`ArrayTensor`] holding a materialized copy.
    fn copy(&self) -> Result<ArrayTensor, TensorError> {
        ArrayTensor::new(
            self.to_array()?,
            self.user_coords().clone(),
            self.field_grid().clone(),
        )
    }
}
