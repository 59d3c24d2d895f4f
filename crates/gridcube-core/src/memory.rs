//! In-memory fields built from metadata dictionaries.
//!
//! [`DictFieldList`] is the reference [`FieldList`] implementation: fields
//! live behind an `Arc` and a list is an index vector over them, so
//! selection and sorting never copy field data.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::dates::{datetime_from_grib, step_to_delta};
use crate::field::{Field, FieldList};
use crate::value::Value;

/// Keys that stand in for each other when the exact key is absent.
const KEY_GROUPS: &[&[&str]] = &[
    &["dataDate", "date"],
    &["dataTime", "time"],
    &["level", "levelist"],
    &["step", "endStep", "stepRange"],
    &["param", "shortName"],
];

/// Fixed key subsets exposed per metadata namespace.
const NAMESPACES: &[(&str, &[&str])] = &[
    (
        "mars",
        &[
            "class", "stream", "type", "expver", "date", "time", "step", "param", "levtype",
            "levelist", "number", "domain",
        ],
    ),
    (
        "ls",
        &[
            "centre",
            "shortName",
            "typeOfLevel",
            "level",
            "dataDate",
            "dataTime",
            "stepRange",
            "dataType",
            "number",
            "gridType",
        ],
    ),
    (
        "time",
        &[
            "dataDate",
            "dataTime",
            "stepUnits",
            "stepType",
            "stepRange",
            "startStep",
            "endStep",
            "validityDate",
            "validityTime",
        ],
    ),
    ("vertical", &["typeOfLevel", "level"]),
    (
        "geography",
        &[
            "gridType",
            "Ni",
            "Nj",
            "latitudeOfFirstGridPointInDegrees",
            "longitudeOfFirstGridPointInDegrees",
            "latitudeOfLastGridPointInDegrees",
            "longitudeOfLastGridPointInDegrees",
            "iDirectionIncrementInDegrees",
            "jDirectionIncrementInDegrees",
        ],
    ),
];

/// A field whose metadata is an ordered key-value map.
#[derive(Clone, Debug, PartialEq)]
pub struct DictField {
    metadata: IndexMap<String, Value>,
    values: Vec<f64>,
    shape: SmallVec<[usize; 2]>,
}

impl DictField {
    /// Create a field from metadata and values.
    ///
    /// The grid shape is `[Nj, Ni]` when both keys are present and
    /// integral, else `[values.len()]`.
    pub fn new(metadata: IndexMap<String, Value>, values: Vec<f64>) -> Self {
        let dim = |k: &str| {
            metadata
                .get(k)
                .and_then(Value::as_i64)
                .and_then(|v| usize::try_from(v).ok())
        };
        let shape = match (dim("Nj"), dim("Ni")) {
            (Some(nj), Some(ni)) => SmallVec::from_slice(&[nj, ni]),
            _ => SmallVec::from_slice(&[values.len()]),
        };
        Self {
            metadata,
            values,
            shape,
        }
    }

    /// Create a field from `(key, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I, values: Vec<f64>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let metadata = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(metadata, values)
    }

    /// The stored metadata map, without derived keys.
    pub fn raw_metadata(&self) -> &IndexMap<String, Value> {
        &self.metadata
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        if let Some(v) = self.metadata.get(key) {
            return Some(v);
        }
        KEY_GROUPS
            .iter()
            .find(|group| group.contains(&key))
            .and_then(|group| group.iter().find_map(|k| self.metadata.get(*k)))
    }

    fn base_datetime(&self) -> Option<chrono::NaiveDateTime> {
        let date = self.lookup("date")?.as_i64()?;
        let time = self.lookup("time").and_then(Value::as_i64).unwrap_or(0);
        datetime_from_grib(date, time).ok()
    }

    fn valid_datetime(&self) -> Option<chrono::NaiveDateTime> {
        let base = self.base_datetime()?;
        let step = match self.lookup("endStep").or_else(|| self.lookup("step")) {
            Some(v) => step_to_delta(v).ok()?,
            None => chrono::TimeDelta::zero(),
        };
        base.checked_add_signed(step)
    }
}

fn iso(dt: chrono::NaiveDateTime) -> Value {
    Value::Str(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

impl Field for DictField {
    fn metadata(&self, key: &str) -> Option<Value> {
        if let Some(v) = self.lookup(key) {
            return Some(v.clone());
        }
        match key {
            "base_datetime" | "forecast_reference_time" => self.base_datetime().map(iso),
            "valid_datetime" | "valid_time" => self.valid_datetime().map(iso),
            _ => None,
        }
    }

    fn namespace(&self, namespace: &str) -> IndexMap<String, Value> {
        let Some((_, keys)) = NAMESPACES.iter().find(|(ns, _)| *ns == namespace) else {
            return IndexMap::new();
        };
        keys.iter()
            .filter_map(|k| self.lookup(k).map(|v| (k.to_string(), v.clone())))
            .collect()
    }

    fn values(&self) -> &[f64] {
        &self.values
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

/// A list of [`DictField`]s sharing storage across selections.
///
/// # Examples
///
/// ```
/// use gridcube_core::{DictField, DictFieldList, FieldList, Value};
///
/// let ds = DictFieldList::from_fields(vec![
///     DictField::from_pairs([("param", "t"), ("levtype", "pl")], vec![1.0]),
///     DictField::from_pairs([("param", "r"), ("levtype", "pl")], vec![2.0]),
/// ]);
/// let sorted = ds.order_by(&["param"]);
/// assert_eq!(sorted.metadata(0, "param"), Some(Value::from("r")));
/// ```
#[derive(Clone, Debug)]
pub struct DictFieldList {
    fields: Arc<Vec<DictField>>,
    order: Vec<usize>,
    index_keys: Arc<Vec<String>>,
}

impl DictFieldList {
    /// Wrap `fields` in list order.
    pub fn from_fields(fields: Vec<DictField>) -> Self {
        let order = (0..fields.len()).collect();
        Self {
            fields: Arc::new(fields),
            order,
            index_keys: Arc::new(Vec::new()),
        }
    }

    /// Build fields from metadata dictionaries. Each field gets `values`.
    pub fn from_dicts<I>(dicts: I, values: &[f64]) -> Self
    where
        I: IntoIterator<Item = IndexMap<String, Value>>,
    {
        Self::from_fields(
            dicts
                .into_iter()
                .map(|m| DictField::new(m, values.to_vec()))
                .collect(),
        )
    }

    /// Declare `keys` as indices of the list, reported by
    /// [`FieldList::indexed`].
    pub fn with_index_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_keys = Arc::new(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Iterate over the fields in list order.
    pub fn iter(&self) -> impl Iterator<Item = &DictField> + '_ {
        self.order.iter().filter_map(|&i| self.fields.get(i))
    }
}

impl FieldList for DictFieldList {
    type Field = DictField;

    fn len(&self) -> usize {
        self.order.len()
    }

    fn get(&self, index: usize) -> Option<&DictField> {
        self.order.get(index).and_then(|&i| self.fields.get(i))
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
            order: indices
                .iter()
                .filter_map(|&i| self.order.get(i).copied())
                .collect(),
            index_keys: Arc::clone(&self.index_keys),
        }
    }

    fn indexed(&self, key: &str) -> Option<Vec<Value>> {
        if !self.index_keys.iter().any(|k| k == key) {
            return None;
        }
        let set: BTreeSet<Value> = self.iter().filter_map(|f| f.metadata(key)).collect();
        Some(set.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(pairs: &[(&str, Value)]) -> DictField {
        DictField::from_pairs(pairs.iter().cloned(), vec![0.0; 4])
    }

    #[test]
    fn key_groups_and_param_fallback() {
        let f = field(&[("param", Value::from("r"))]);
        assert_eq!(f.metadata("shortName"), Some(Value::from("r")));

        let f = field(&[
            ("shortName", Value::from("t")),
            ("dataDate", Value::from(20210101)),
            ("levelist", Value::from(850)),
            ("stepRange", Value::from("6")),
        ]);
        assert_eq!(f.metadata("param"), Some(Value::from("t")));
        assert_eq!(f.metadata("date"), Some(Value::from(20210101)));
        assert_eq!(f.metadata("level"), Some(Value::from(850)));
        assert_eq!(f.metadata("endStep"), Some(Value::from("6")));
        assert_eq!(f.metadata("number"), None);
    }

    #[test]
    fn derived_datetimes() {
        let f = field(&[
            ("date", Value::from(20210101)),
            ("time", Value::from(1200)),
            ("step", Value::from(6)),
        ]);
        assert_eq!(
            f.metadata("forecast_reference_time"),
            Some(Value::from("2021-01-01T12:00:00"))
        );
        assert_eq!(
            f.metadata("valid_time"),
            Some(Value::from("2021-01-01T18:00:00"))
        );
    }

    #[test]
    fn no_derived_datetime_without_date() {
        let f = field(&[("time", Value::from(1200)), ("step", Value::from(0))]);
        assert_eq!(f.metadata("base_datetime"), None);
        assert_eq!(f.metadata("valid_datetime"), None);
    }

    #[test]
    fn shape_from_grid_keys() {
        let f = field(&[("Nj", Value::from(2)), ("Ni", Value::from(2))]);
        assert_eq!(f.shape(), &[2, 2]);
        let f = field(&[("param", Value::from("t"))]);
        assert_eq!(f.shape(), &[4]);
    }

    #[test]
    fn namespace_returns_present_keys_only() {
        let f = field(&[
            ("class", Value::from("od")),
            ("param", Value::from("t")),
            ("levtype", Value::from("pl")),
        ]);
        let mars = f.namespace("mars");
        assert_eq!(
            mars.keys().collect::<Vec<_>>(),
            vec!["class", "param", "levtype"]
        );
        assert!(f.namespace("unknown").is_empty());
    }

    #[test]
    fn select_shares_storage_and_composes() {
        let ds = DictFieldList::from_fields(
            (0..4)
                .map(|i| field(&[("n", Value::from(i))]))
                .collect(),
        );
        let sub = ds.select(&[3, 1]);
        assert!(Arc::ptr_eq(&ds.fields, &sub.fields));
        assert_eq!(sub.metadata(0, "n"), Some(Value::from(3)));
        let subsub = sub.select(&[1]);
        assert_eq!(subsub.metadata(0, "n"), Some(Value::from(1)));
        assert_eq!(subsub.len(), 1);
    }

    #[test]
    fn order_by_is_stable_with_missing_first() {
        let ds = DictFieldList::from_fields(vec![
            field(&[("a", Value::from(2)), ("id", Value::from(0))]),
            field(&[("id", Value::from(1))]),
            field(&[("a", Value::from(1)), ("id", Value::from(2))]),
            field(&[("a", Value::from(2)), ("id", Value::from(3))]),
        ]);
        let sorted = ds.order_by(&["a"]);
        let ids: Vec<_> = sorted.metadata_all("id").into_iter().flatten().collect();
        assert_eq!(
            ids,
            vec![Value::from(1), Value::from(2), Value::from(0), Value::from(3)]
        );
    }

    #[test]
    fn indexed_only_for_declared_keys() {
        let ds = DictFieldList::from_fields(vec![
            field(&[("levtype", Value::from("pl"))]),
            field(&[("levtype", Value::from("pl"))]),
        ])
        .with_index_keys(["levtype"]);
        assert_eq!(ds.indexed("levtype"), Some(vec![Value::from("pl")]));
        assert_eq!(ds.indexed("param"), None);
    }

    #[test]
    fn typed_metadata_and_unique_values() {
        let ds = DictFieldList::from_fields(vec![
            field(&[("levelist", Value::from("1000"))]),
            field(&[("levelist", Value::from("850"))]),
            field(&[("levelist", Value::from("850"))]),
        ]);
        let u = ds.unique_values(&["levelist:l"]);
        assert_eq!(u["levelist:l"], vec![Value::from(850), Value::from(1000)]);
        assert_eq!(ds.sel(&[("levelist:l", Value::from(850))]).len(), 2);
    }

    #[test]
    fn to_array_rejects_ragged_fields() {
        let ds = DictFieldList::from_fields(vec![
            DictField::from_pairs([("a", 1)], vec![1.0, 2.0]),
            DictField::from_pairs([("a", 2)], vec![3.0]),
        ]);
        assert!(matches!(
            ds.to_array(),
            Err(crate::FieldError::ShapeMismatch { index: 1, .. })
        ));
        let ok = ds.select(&[0]).to_array().unwrap();
        assert_eq!(ok.shape(), &[1, 2]);
    }
}
