//! A tensor backed by an in-memory array.

use ndarray::{ArrayD, Axis};

use crate::coords::CubeCoords;
use crate::error::TensorError;
use crate::grid::FieldGrid;
use crate::index::Shape;
use crate::tensor::Tensor;

/// A tensor holding its data, detached from any field list.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayTensor {
    array: ArrayD<f64>,
    user_coords: CubeCoords,
    grid: FieldGrid,
}

impl ArrayTensor {
    /// Wrap `array`, whose shape must be the coordinate shape followed by
    /// the grid shape.
    pub fn new(
        array: ArrayD<f64>,
        user_coords: CubeCoords,
        grid: FieldGrid,
    ) -> Result<Self, TensorError> {
        let tensor = Self {
            array,
            user_coords,
            grid,
        };
        tensor.check_shape()?;
        Ok(tensor)
    }

    /// The stored array.
    pub fn array(&self) -> &ArrayD<f64> {
        &self.array
    }

    /// Unwrap into the stored array.
    pub fn into_array(self) -> ArrayD<f64> {
        self.array
    }
}

impl Tensor for ArrayTensor {
    fn user_coords(&self) -> &CubeCoords {
        &self.user_coords
    }

    fn field_grid(&self) -> &FieldGrid {
        &self.grid
    }

    fn full_shape(&self) -> Shape {
        self.array.shape().iter().copied().collect()
    }

    fn subset(&self, positions: &[Vec<usize>]) -> Result<Self, TensorError> {
        let mut array = self.array.clone();
        for (axis, keep) in positions.iter().enumerate() {
            array = array.select(Axis(axis), keep);
        }
        Self::new(array, self.user_coords.subset(positions), self.grid.clone())
    }

    fn to_array(&self) -> Result<ArrayD<f64>, TensorError> {
        Ok(self.array.clone())
    }
}
