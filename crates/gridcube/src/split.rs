//! Split a field list into one tensor per variable.

use gridcube_core::{FieldList, Remapped, Value};
use gridcube_dims::{Coord, Dims, DimsConfig};
use gridcube_tensor::{FieldListTensor, Tensor, TensorOptions};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::Error;

/// One variable: its tensor and the typed coordinates of its dimensions.
#[derive(Clone, Debug)]
pub struct Variable<L> {
    /// Tensor over the variable's fields.
    pub tensor: FieldListTensor<Remapped<L>>,
    /// Coordinates keyed by coordinate name, in dimension order.
    pub coords: IndexMap<String, Coord>,
}

/// The outcome of [`build_variable_tensors`].
#[derive(Clone, Debug)]
pub struct VariableTensors<L> {
    /// Dimensions resolved against the whole field list.
    pub dims: Dims,
    /// Variables keyed by variable-key value, sorted.
    pub variables: IndexMap<Value, Variable<L>>,
}

/// Resolve dimensions for `ds` and build one tensor per variable.
///
/// Fields are grouped by the value of the variable key. Each group is
/// reduced against the run's dimensions on its own, so a surface variable
/// without levels loses the level dimension while pressure-level
/// variables keep it.
///
/// # Examples
///
/// ```
/// use gridcube::prelude::*;
/// use gridcube_test_utils::ds_date_lev;
///
/// let config = DimsConfig {
///     time_dim_mode: TimeDimMode::Raw,
///     ..Default::default()
/// };
/// let out = build_variable_tensors(&config, ds_date_lev()).unwrap();
/// let t = &out.variables[&Value::from("t")].tensor;
/// assert_eq!(t.user_shape().as_slice(), &[2, 2]);
/// ```
pub fn build_variable_tensors<L: FieldList>(
    config: &DimsConfig,
    ds: L,
) -> Result<VariableTensors<L>, Error> {
    let (dims, ds) = Dims::build(config, ds)?;
    let key = dims.variable_key().to_string();
    let names = ds
        .unique_values(&[key.as_str()])
        .swap_remove(&key)
        .unwrap_or_default();
    if names.is_empty() {
        return Err(Error::NoVariables { variable_key: key });
    }

    let mut variables = IndexMap::with_capacity(names.len());
    for name in names {
        let fields = ds.sel(&[(key.as_str(), name.clone())]);
        let mut var_dims = dims.clone();
        var_dims.update(&fields)?;
        let dim_keys = var_dims.active_dim_keys();
        let dim_keys: Vec<&str> = dim_keys.iter().map(String::as_str).collect();

        let tensor =
            FieldListTensor::from_fieldlist(&fields, &dim_keys, TensorOptions::default())?;
        let user_coords = tensor.user_coords().clone().into_inner();
        let coords = var_dims.as_coord(&user_coords, tensor.source())?;
        debug!(variable = %name, dims = ?dim_keys, "built variable tensor");
        variables.insert(name, Variable { tensor, coords });
    }
    Ok(VariableTensors { dims, variables })
}
