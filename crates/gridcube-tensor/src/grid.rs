//! Field-level grid description: the trailing dimensions of a tensor.

use gridcube_core::{Field, Value};
use indexmap::IndexMap;

use crate::index::Shape;

/// Grid types whose latitudes and longitudes are regularly spaced.
const REGULAR_LATLON: &[&str] = &["regular_ll"];

/// Dimension names and coordinates of one field's grid.
///
/// Every field of a tensor shares the grid of its first field; slicing a
/// tensor never changes it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldGrid {
    dims: IndexMap<String, usize>,
    coords: IndexMap<String, Vec<f64>>,
}

impl FieldGrid {
    /// Describe the grid of `field`.
    ///
    /// A one-dimensional grid, or any grid when `flatten` is set, becomes a
    /// single `values` dimension. A two-dimensional regular lat-lon grid
    /// gets `latitude`/`longitude` coordinates computed from its geography
    /// metadata. Other grids get positional `y`/`x` dimensions.
    pub fn build<F: Field>(field: &F, flatten: bool) -> Self {
        let shape = field.shape();
        if flatten || shape.len() != 2 {
            let n = shape.iter().product();
            return Self::positional(&[("values", n)]);
        }
        let (nj, ni) = (shape[0], shape[1]);
        let regular = field
            .metadata("gridType")
            .as_ref()
            .and_then(Value::as_str)
            .is_some_and(|g| REGULAR_LATLON.contains(&g));
        if regular {
            let geo = field.namespace("geography");
            let read = |k: &str| geo.get(k).and_then(Value::as_f64);
            if let (Some(lat0), Some(lat1), Some(lon0), Some(lon1)) = (
                read("latitudeOfFirstGridPointInDegrees"),
                read("latitudeOfLastGridPointInDegrees"),
                read("longitudeOfFirstGridPointInDegrees"),
                read("longitudeOfLastGridPointInDegrees"),
            ) {
                let mut dims = IndexMap::new();
                dims.insert("latitude".to_string(), nj);
                dims.insert("longitude".to_string(), ni);
                let mut coords = IndexMap::new();
                coords.insert("latitude".to_string(), linspace(lat0, lat1, nj));
                coords.insert("longitude".to_string(), linspace(lon0, lon1, ni));
                return Self { dims, coords };
            }
        }
        Self::positional(&[("y", nj), ("x", ni)])
    }

    fn positional(dims: &[(&str, usize)]) -> Self {
        Self {
            dims: dims.iter().map(|&(k, n)| (k.to_string(), n)).collect(),
            coords: dims
                .iter()
                .map(|&(k, n)| (k.to_string(), (0..n).map(|i| i as f64).collect()))
                .collect(),
        }
    }

    /// Dimension name to length.
    pub fn dims(&self) -> &IndexMap<String, usize> {
        &self.dims
    }

    /// Coordinate values per dimension.
    pub fn coords(&self) -> &IndexMap<String, Vec<f64>> {
        &self.coords
    }

    /// Grid shape.
    pub fn shape(&self) -> Shape {
        self.dims.values().copied().collect()
    }

    /// Number of values per field.
    pub fn size(&self) -> usize {
        self.dims.values().product()
    }
}

fn linspace(first: f64, last: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![first; n];
    }
    let step = (last - first) / (n - 1) as f64;
    (0..n).map(|i| first + step * i as f64).collect()
}
