//! The [`Field`] and [`FieldList`] traits.
//!
//! These are the narrow interfaces through which the dimension and tensor
//! layers consume decoded data: a field exposes scalar metadata by key,
//! numeric values and a grid shape; a field list supports indexing,
//! selection by position, sorting and distinct-value queries.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use ndarray::Array2;

use crate::error::FieldError;
use crate::key::MetadataKey;
use crate::value::Value;

/// One gridded field with key-value metadata.
pub trait Field {
    /// Scalar metadata for `key`, or `None` when the key is absent.
    fn metadata(&self, key: &str) -> Option<Value>;

    /// Metadata grouped under a namespace (e.g. `"mars"`, `"geography"`).
    ///
    /// Used only for diagnostics. The default returns an empty map.
    fn namespace(&self, _namespace: &str) -> IndexMap<String, Value> {
        IndexMap::new()
    }

    /// Flat numeric values of the field.
    fn values(&self) -> &[f64];

    /// Grid shape of the field, e.g. `[nj, ni]` or `[n]`.
    fn shape(&self) -> &[usize];
}

/// An ordered collection of fields.
///
/// Implementations are cheap-to-clone handles: [`select`](Self::select)
/// returns a new list that shares field storage with `self`.
pub trait FieldList: Clone {
    /// Field type yielded by [`get`](Self::get).
    type Field: Field;

    /// Number of fields.
    fn len(&self) -> usize;

    /// Whether the list holds no fields.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field at `index`.
    fn get(&self, index: usize) -> Option<&Self::Field>;

    /// New list made of the fields at `indices`, in that order.
    fn select(&self, indices: &[usize]) -> Self;

    /// Metadata of the field at `index`.
    ///
    /// `key` may carry a type suffix (`"levelist:l"`); keys with an
    /// unsupported suffix read as absent. Callers that need the error
    /// should validate with [`MetadataKey::parse`] up front.
    fn metadata(&self, index: usize, key: &str) -> Option<Value> {
        let key = MetadataKey::parse(key).ok()?;
        let value = self.get(index)?.metadata(&key.name)?;
        key.ty.cast(value)
    }

    /// Distinct values of `key` when the list carries it as an index.
    ///
    /// The default reports no indices.
    fn indexed(&self, _key: &str) -> Option<Vec<Value>> {
        None
    }

    /// Metadata of `key` for every field, in list order.
    fn metadata_all(&self, key: &str) -> Vec<Option<Value>> {
        (0..self.len()).map(|i| self.metadata(i, key)).collect()
    }

    /// Stable ascending sort by `keys`. Missing values sort first.
    fn order_by(&self, keys: &[&str]) -> Self {
        let rows: Vec<Vec<Option<Value>>> = (0..self.len())
            .map(|i| keys.iter().map(|k| self.metadata(i, k)).collect())
            .collect();
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| rows[a].cmp(&rows[b]));
        self.select(&order)
    }

    /// Sorted distinct non-missing values of each key.
    fn unique_values(&self, keys: &[&str]) -> IndexMap<String, Vec<Value>> {
        keys.iter()
            .map(|&k| {
                let set: BTreeSet<Value> = (0..self.len())
                    .filter_map(|i| self.metadata(i, k))
                    .collect();
                (k.to_string(), set.into_iter().collect())
            })
            .collect()
    }

    /// Fields whose metadata equals every `(key, value)` filter.
    fn sel(&self, filters: &[(&str, Value)]) -> Self {
        let indices: Vec<usize> = (0..self.len())
            .filter(|&i| {
                filters
                    .iter()
                    .all(|(k, v)| self.metadata(i, k).as_ref() == Some(v))
            })
            .collect();
        self.select(&indices)
    }

    /// Stack field values into a `(len, n_values)` array.
    ///
    /// All fields must hold the same number of values.
    fn to_array(&self) -> Result<Array2<f64>, FieldError> {
        let first = self.get(0).ok_or(FieldError::EmptyFieldList)?;
        let n = first.values().len();
        let mut data = Vec::with_capacity(n * self.len());
        for i in 0..self.len() {
            let field = self.get(i).ok_or(FieldError::EmptyFieldList)?;
            let values = field.values();
            if values.len() != n {
                return Err(FieldError::ShapeMismatch {
                    index: i,
                    expected: n,
                    actual: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Array2::from_shape_vec((self.len(), n), data).map_err(|_| FieldError::ShapeMismatch {
            index: 0,
            expected: n,
            actual: n,
        })
    }
}
