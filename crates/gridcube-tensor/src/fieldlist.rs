//! A tensor view over a field list.
//!
//! The field list stays the data source: subsetting selects fields by
//! position and materialization stacks their values.

use chrono::NaiveDateTime;
use gridcube_core::dates::to_datetime;
use gridcube_core::{FieldError, FieldList, MetadataKey, Value};
use ndarray::{ArrayD, IxDyn};
use tracing::{debug, warn};

use crate::check::check_hypercube;
use crate::coords::CubeCoords;
use crate::error::TensorError;
use crate::grid::FieldGrid;
use crate::index::{product_indices, Shape};
use crate::selection::Indexer;
use crate::tensor::Tensor;

/// Dimension combinations from which valid datetimes can be read, most
/// specific first.
const VALID_DATETIME_DIMS: &[&[&str]] = &[
    &["base_datetime", "step"],
    &["base_datetime"],
    &["date", "time", "step"],
    &["date", "time"],
    &["date", "step"],
    &["time", "step"],
    &["step"],
];

/// Dimensions that already hold valid datetimes.
const VALID_DATETIME_KEYS: [&str; 2] = ["valid_datetime", "valid_time"];

/// Options for [`FieldListTensor::from_fieldlist`].
#[derive(Clone, Debug, PartialEq)]
pub struct TensorOptions {
    /// Sort the field list by the dimension keys. Default `true`.
    ///
    /// Without sorting the list must already be in dimension order.
    pub sort: bool,
    /// Treat every field grid as one `values` dimension. Default `false`.
    pub flatten_values: bool,
    /// Precomputed user coordinates; read from the list when `None`.
    pub user_coords: Option<CubeCoords>,
    /// Precomputed grid; built from the first field when `None`.
    pub field_grid: Option<FieldGrid>,
}

impl TensorOptions {
    /// Default for [`sort`](Self::sort).
    pub const DEFAULT_SORT: bool = true;
    /// Default for [`flatten_values`](Self::flatten_values).
    pub const DEFAULT_FLATTEN_VALUES: bool = false;
}

impl Default for TensorOptions {
    fn default() -> Self {
        Self {
            sort: Self::DEFAULT_SORT,
            flatten_values: Self::DEFAULT_FLATTEN_VALUES,
            user_coords: None,
            field_grid: None,
        }
    }
}

/// Valid datetimes spanned by a tensor's time dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidDatetime {
    /// Time dimensions, in user dimension order.
    pub dims: Vec<String>,
    /// One datetime per combination of the dimensions' coordinates.
    pub values: ArrayD<NaiveDateTime>,
}

/// A tensor whose fields live in a [`FieldList`].
#[derive(Clone, Debug)]
pub struct FieldListTensor<L> {
    source: L,
    user_coords: CubeCoords,
    grid: FieldGrid,
    flatten_values: bool,
}

impl<L: FieldList> FieldListTensor<L> {
    /// Build a tensor over `ds` with one user dimension per key in `names`.
    ///
    /// The list is sorted by `names` (unless disabled) and each dimension's
    /// coordinates are the sorted distinct values of its key, so position
    /// `i` of the sorted list maps to the coordinate tuple
    /// `index_to_coords(i, user_shape)`.
    ///
    /// # Errors
    ///
    /// [`FieldError::UnsupportedKeyType`] for a name with an unknown type
    /// suffix, [`FieldError::EmptyFieldList`] for an empty list and
    /// [`TensorError::Hypercube`] when the list does not hold exactly one
    /// field per coordinate tuple.
    pub fn from_fieldlist(
        ds: &L,
        names: &[&str],
        options: TensorOptions,
    ) -> Result<Self, TensorError> {
        for name in names {
            MetadataKey::parse(name)?;
        }
        if ds.is_empty() {
            return Err(FieldError::EmptyFieldList.into());
        }
        let source = if !names.is_empty() && options.sort {
            ds.order_by(names)
        } else {
            ds.clone()
        };
        let user_coords = match options.user_coords {
            Some(coords) => coords,
            None => ds.unique_values(names).into_iter().collect(),
        };
        let grid = match options.field_grid {
            Some(grid) => grid,
            None => {
                let first = source.get(0).ok_or(FieldError::EmptyFieldList)?;
                FieldGrid::build(first, options.flatten_values)
            }
        };
        Self::new(source, user_coords, grid, options.flatten_values)
    }

    /// A tensor over `source` sharing `owner`'s grid.
    pub fn from_tensor(
        owner: &Self,
        source: L,
        user_coords: CubeCoords,
    ) -> Result<Self, TensorError> {
        Self::new(source, user_coords, owner.grid.clone(), owner.flatten_values)
    }

    fn new(
        source: L,
        user_coords: CubeCoords,
        grid: FieldGrid,
        flatten_values: bool,
    ) -> Result<Self, TensorError> {
        let tensor = Self {
            source,
            user_coords,
            grid,
            flatten_values,
        };
        tensor.check_shape()?;
        if let Err(e) = check_hypercube(&tensor.source, &tensor.user_coords) {
            warn!(
                expected = e.expected,
                actual = e.actual,
                "field list does not form a full hypercube"
            );
            return Err(e.into());
        }
        let (user_shape, field_shape) = (tensor.user_shape(), tensor.field_shape());
        debug!(?user_shape, ?field_shape, "built field list tensor");
        Ok(tensor)
    }

    /// The underlying field list, in tensor order.
    pub fn source(&self) -> &L {
        &self.source
    }

    /// Whether field grids are flattened.
    pub fn flatten_values(&self) -> bool {
        self.flatten_values
    }

    /// Materialize the positional selection `indexers`.
    ///
    /// Selecting everything is the same as [`to_array`](Tensor::to_array).
    pub fn to_array_at(&self, indexers: &[Indexer]) -> Result<ArrayD<f64>, TensorError> {
        if indexers.iter().all(Indexer::is_full) {
            return self.to_array();
        }
        self.index(indexers)?.to_array()
    }

    /// Valid datetimes spanned by the time dimensions.
    ///
    /// A `valid_datetime` or `valid_time` dimension is decoded directly.
    /// Otherwise the first fully present combination of base datetime,
    /// date, time and step dimensions is used; the values are read from
    /// the fields at the first coordinate of every other dimension.
    /// Returns `None` when the tensor has no time dimensions.
    pub fn valid_datetime(&self) -> Result<Option<ValidDatetime>, TensorError> {
        for key in VALID_DATETIME_KEYS {
            if let Some(values) = self.user_coords.get(key) {
                let parsed = values
                    .iter()
                    .map(to_datetime)
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Some(ValidDatetime {
                    dims: vec![key.to_string()],
                    values: ArrayD::from_shape_vec(IxDyn(&[parsed.len()]), parsed)
                        .map_err(|_| self.shape_error())?,
                }));
            }
        }

        let Some(combo) = VALID_DATETIME_DIMS
            .iter()
            .find(|combo| combo.iter().all(|d| self.user_coords.contains(d)))
        else {
            return Ok(None);
        };
        let dims: Vec<String> = self
            .user_coords
            .names()
            .filter(|n| combo.contains(n))
            .map(str::to_string)
            .collect();
        let filters: Vec<(&str, Value)> = self
            .user_coords
            .iter()
            .filter(|(n, _)| !combo.contains(n))
            .filter_map(|(n, values)| values.first().map(|v| (n, v.clone())))
            .collect();
        let fields = if filters.is_empty() {
            self.source.clone()
        } else {
            self.source.sel(&filters)
        };
        let parsed = fields
            .metadata_all("valid_datetime")
            .into_iter()
            .map(|v| {
                v.ok_or_else(|| FieldError::InvalidDate {
                    value: "None".to_string(),
                })
                .and_then(|v| to_datetime(&v))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let shape: Vec<usize> = dims
            .iter()
            .filter_map(|d| self.user_coords.get(d).map(<[Value]>::len))
            .collect();
        let values =
            ArrayD::from_shape_vec(IxDyn(&shape), parsed).map_err(|_| self.shape_error())?;
        Ok(Some(ValidDatetime { dims, values }))
    }

    fn shape_error(&self) -> TensorError {
        TensorError::ShapeMismatch {
            shape: vec![self.source.len()],
            expected: self.full_shape().to_vec(),
        }
    }
}

impl<L: FieldList> Tensor for FieldListTensor<L> {
    fn user_coords(&self) -> &CubeCoords {
        &self.user_coords
    }

    fn field_grid(&self) -> &FieldGrid {
        &self.grid
    }

    fn full_shape(&self) -> Shape {
        let mut shape = self.user_shape();
        shape.extend(self.field_shape());
        shape
    }

    fn subset(&self, positions: &[Vec<usize>]) -> Result<Self, TensorError> {
        let indices = product_indices(positions, &self.user_shape());
        let source = self.source.select(&indices);
        Self::from_tensor(self, source, self.user_coords.subset(positions))
    }

    fn to_array(&self) -> Result<ArrayD<f64>, TensorError> {
        let shape = self.full_shape();
        if self.source.is_empty() {
            return Ok(ArrayD::zeros(IxDyn(&shape)));
        }
        let stacked = self.source.to_array()?;
        let found = stacked.shape().to_vec();
        stacked
            .into_shape_with_order(IxDyn(&shape))
            .map_err(|_| TensorError::ShapeMismatch {
                shape: found,
                expected: shape.to_vec(),
            })
    }
}
