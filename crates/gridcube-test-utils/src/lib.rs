//! Test fixtures for gridcube development.
//!
//! Field lists are described as ordered `key -> values` tables and expanded
//! into the cartesian product of their values, first key varying slowest.
//! A `None` value leaves the key off the field.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use gridcube_core::{DictField, DictFieldList, Value};
use indexmap::IndexMap;

/// Number of values carried by every fixture field without a grid.
pub const VALUES_LEN: usize = 4;

/// One column of a fixture table.
pub type Column = (&'static str, Vec<Option<Value>>);

pub fn ints(values: &[i64]) -> Vec<Option<Value>> {
    values.iter().map(|&v| Some(Value::Int(v))).collect()
}

pub fn strs(values: &[&str]) -> Vec<Option<Value>> {
    values.iter().map(|&v| Some(Value::from(v))).collect()
}

pub fn missing() -> Vec<Option<Value>> {
    vec![None]
}

/// Expand `table` into metadata dictionaries.
pub fn cartesian_dicts(table: &[Column]) -> Vec<IndexMap<String, Value>> {
    let mut rows: Vec<IndexMap<String, Value>> = vec![IndexMap::new()];
    for (key, values) in table {
        let mut next = Vec::with_capacity(rows.len() * values.len());
        for row in &rows {
            for v in values {
                let mut r = row.clone();
                if let Some(v) = v {
                    r.insert(key.to_string(), v.clone());
                }
                next.push(r);
            }
        }
        rows = next;
    }
    rows
}

/// Expand `table` into a field list. Field `i` holds `VALUES_LEN` copies
/// of `i as f64`.
pub fn cartesian_fields(table: &[Column]) -> DictFieldList {
    DictFieldList::from_fields(
        cartesian_dicts(table)
            .into_iter()
            .enumerate()
            .map(|(i, m)| DictField::new(m, vec![i as f64; VALUES_LEN]))
            .collect(),
    )
}

/// Like [`cartesian_fields`] on a global regular lat-lon `nj x ni` grid.
/// Field `i` holds `i * 100 + k` at grid point `k`.
pub fn cartesian_grid_fields(table: &[Column], nj: usize, ni: usize) -> DictFieldList {
    DictFieldList::from_fields(
        cartesian_dicts(table)
            .into_iter()
            .enumerate()
            .map(|(i, mut m)| {
                m.insert("gridType".into(), Value::from("regular_ll"));
                m.insert("Nj".into(), Value::Int(nj as i64));
                m.insert("Ni".into(), Value::Int(ni as i64));
                m.insert("latitudeOfFirstGridPointInDegrees".into(), Value::Float(90.0));
                m.insert("latitudeOfLastGridPointInDegrees".into(), Value::Float(-90.0));
                m.insert("longitudeOfFirstGridPointInDegrees".into(), Value::Float(0.0));
                m.insert(
                    "longitudeOfLastGridPointInDegrees".into(),
                    Value::Float(360.0 - 360.0 / ni as f64),
                );
                let values = (0..nj * ni).map(|k| (i * 100 + k) as f64).collect();
                DictField::new(m, values)
            })
            .collect(),
    )
}

/// Concatenate several tables into one field list.
pub fn concat_fields(tables: &[Vec<Column>]) -> DictFieldList {
    let mut fields = Vec::new();
    for table in tables {
        for m in cartesian_dicts(table) {
            let i = fields.len();
            fields.push(DictField::new(m, vec![i as f64; VALUES_LEN]));
        }
    }
    DictFieldList::from_fields(fields)
}

// ── Canonical tables ────────────────────────────────────────────

pub fn ds_lev_table() -> Vec<Column> {
    vec![
        ("class", strs(&["od"])),
        ("param", strs(&["t", "r"])),
        ("levelist", ints(&[1000, 850])),
        ("time", strs(&["12"])),
        ("step", ints(&[0])),
    ]
}

pub fn ds_date_lev_table() -> Vec<Column> {
    vec![
        ("class", strs(&["od"])),
        ("param", strs(&["t", "r"])),
        ("levelist", ints(&[1000, 850])),
        ("levtype", strs(&["pl"])),
        ("date", strs(&["20210101", "20210102"])),
        ("time", strs(&["12"])),
        ("step", ints(&[0])),
    ]
}

pub fn ds_date_steps_level_table() -> Vec<Column> {
    vec![
        ("class", strs(&["od"])),
        ("param", strs(&["t", "r"])),
        ("levelist", ints(&[1000, 850])),
        ("levtype", strs(&["pl"])),
        ("date", strs(&["20210101", "20210102"])),
        ("time", strs(&["12"])),
        ("step", ints(&[0, 6])),
    ]
}

/// Surface params without a level followed by pressure-level params.
pub fn ds_date_sfc_pl_tables() -> Vec<Vec<Column>> {
    vec![
        vec![
            ("class", strs(&["od"])),
            ("param", strs(&["2t", "msl"])),
            ("levelist", missing()),
            ("levtype", strs(&["sfc"])),
            ("date", strs(&["20210101", "20210102"])),
            ("time", strs(&["12"])),
            ("step", ints(&[0])),
        ],
        vec![
            ("class", strs(&["od"])),
            ("param", strs(&["t", "r"])),
            ("levelist", ints(&[1000, 850])),
            ("levtype", strs(&["pl"])),
            ("date", strs(&["20210101", "20210102"])),
            ("time", strs(&["12"])),
            ("step", ints(&[0])),
        ],
    ]
}

/// `date x levelist x param`, 8 fields already in hypercube order.
pub fn ds_date_level_param_table() -> Vec<Column> {
    vec![
        ("date", ints(&[20210101, 20210102])),
        ("levelist", ints(&[850, 1000])),
        ("param", strs(&["r", "t"])),
        ("levtype", strs(&["pl"])),
    ]
}

pub fn ds_lev() -> DictFieldList {
    cartesian_fields(&ds_lev_table())
}

pub fn ds_date_lev() -> DictFieldList {
    cartesian_fields(&ds_date_lev_table())
}

pub fn ds_date_steps_level() -> DictFieldList {
    cartesian_fields(&ds_date_steps_level_table())
}

pub fn ds_date_sfc_pl() -> DictFieldList {
    concat_fields(&ds_date_sfc_pl_tables())
}

pub fn ds_date_level_param() -> DictFieldList {
    cartesian_fields(&ds_date_level_param_table())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcube_core::FieldList;

    #[test]
    fn first_key_varies_slowest() {
        let ds = cartesian_fields(&[("a", ints(&[1, 2])), ("b", strs(&["x", "y", "z"]))]);
        assert_eq!(ds.len(), 6);
        assert_eq!(ds.metadata(0, "a"), Some(Value::Int(1)));
        assert_eq!(ds.metadata(2, "b"), Some(Value::from("z")));
        assert_eq!(ds.metadata(3, "a"), Some(Value::Int(2)));
    }

    #[test]
    fn missing_values_leave_key_absent() {
        let ds = ds_date_sfc_pl();
        assert_eq!(ds.len(), 12);
        assert_eq!(ds.metadata(0, "levelist"), None);
        assert_eq!(ds.metadata(4, "levelist"), Some(Value::Int(1000)));
    }

    #[test]
    fn grid_fields_have_two_dimensional_shape() {
        use gridcube_core::Field;
        let ds = cartesian_grid_fields(&[("a", ints(&[1]))], 2, 3);
        let f = ds.get(0).unwrap();
        assert_eq!(f.shape(), &[2, 3]);
        assert_eq!(f.values().len(), 6);
    }
}
