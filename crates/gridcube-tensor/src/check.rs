//! The hypercube consistency check.
//!
//! A field list forms a hypercube over its user coordinates when it holds
//! exactly one field per coordinate tuple. On failure the report locates
//! the first field whose metadata disagrees with the coordinate tuple its
//! position implies, and compares it with a neighbouring field.

use gridcube_core::{Field, FieldList, Value};
use indexmap::IndexMap;

use crate::coords::CubeCoords;
use crate::diff::{list_to_str, map_to_str, DictDiff, ListDiff};
use crate::error::{FirstDifference, HypercubeError, NeighbourDiff};
use crate::index::index_to_coords;

/// Metadata namespaces compared in the diagnostic.
pub const NAMESPACES: [&str; 5] = ["mars", "ls", "time", "vertical", "geography"];

/// Items shown per dimension in the report.
const LIST_ITEMS: usize = 10;

/// Verify that `source` holds one field per coordinate tuple of `coords`.
///
/// Only the field count is checked; the metadata walk runs on failure to
/// build the report.
pub fn check_hypercube<L: FieldList>(
    source: &L,
    coords: &CubeCoords,
) -> Result<(), HypercubeError> {
    let shape = coords.shape();
    let expected: usize = shape.iter().product();
    let actual = source.len();
    if expected == actual {
        return Ok(());
    }

    let dims = coords
        .iter()
        .map(|(k, v)| format!("{k} {}", list_to_str(v, LIST_ITEMS)))
        .collect();
    let mut error = HypercubeError {
        expected,
        actual,
        dims,
        first_difference: None,
        neighbour: None,
        metadata: IndexMap::new(),
    };

    let keys: Vec<&str> = coords.names().collect();
    let Some((index, first)) = first_difference(source, coords, &keys) else {
        return Err(error);
    };

    if let Some(field) = source.get(index) {
        error
            .metadata
            .insert("dims".into(), map_to_str(&dim_metadata(source, index, &keys)));
        for ns in NAMESPACES {
            error
                .metadata
                .insert(format!("namespace={ns}"), map_to_str(&field.namespace(ns)));
        }
    }
    error.neighbour = neighbour(source, index, &keys);
    error.first_difference = Some(first);
    Err(error)
}

fn first_difference<L: FieldList>(
    source: &L,
    coords: &CubeCoords,
    keys: &[&str],
) -> Option<(usize, FirstDifference)> {
    let shape = coords.shape();
    (0..source.len()).find_map(|i| {
        let expected: Vec<Option<Value>> = coords
            .at(&index_to_coords(i, &shape))
            .into_iter()
            .map(Some)
            .collect();
        let actual: Vec<Option<Value>> = keys.iter().map(|k| source.metadata(i, k)).collect();
        let diff = ListDiff::diff("dims", &expected, &actual);
        let d = diff.diff_index?;
        Some((
            i,
            FirstDifference {
                index: i,
                dim: keys.get(d)?.to_string(),
                expected: expected.get(d)?.clone()?,
                actual: actual.get(d)?.clone(),
            },
        ))
    })
}

fn neighbour<L: FieldList>(source: &L, index: usize, keys: &[&str]) -> Option<NeighbourDiff> {
    let other = if index > 0 {
        index - 1
    } else if index + 1 < source.len() {
        index + 1
    } else {
        return None;
    };
    let (field, other_field) = (source.get(index)?, source.get(other)?);

    let mut diffs = IndexMap::new();
    let dims = DictDiff::diff(
        &dim_metadata(source, index, keys),
        &dim_metadata(source, other, keys),
    );
    if !dims.same {
        diffs.insert("dims".to_string(), dims.diff_text);
    }
    for ns in NAMESPACES {
        let diff = DictDiff::diff(&field.namespace(ns), &other_field.namespace(ns));
        if !diff.same {
            diffs.insert(format!("namespace={ns}"), diff.diff_text);
        }
    }
    Some(NeighbourDiff {
        index,
        other,
        diffs,
    })
}

fn dim_metadata<L: FieldList>(source: &L, index: usize, keys: &[&str]) -> IndexMap<String, Value> {
    keys.iter()
        .filter_map(|k| source.metadata(index, k).map(|v| (k.to_string(), v)))
        .collect()
}
