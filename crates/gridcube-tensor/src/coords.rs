//! User coordinates of a tensor: one ordered value list per dimension.

use std::fmt;

use gridcube_core::Value;
use indexmap::IndexMap;

use crate::index::Shape;

/// Items shown before the display of a coordinate list is elided.
const DISPLAY_ITEMS: usize = 10;

/// Ordered mapping from user dimension name to its coordinate values.
///
/// Insertion order is dimension order, so the mapping defines the user
/// shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CubeCoords(IndexMap<String, Vec<Value>>);

impl CubeCoords {
    /// Empty coordinates (a scalar user shape).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or replace the values of `name`.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Value>) {
        self.0.insert(name.into(), values);
    }

    /// Values of `name`.
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Position of `name` among the dimensions.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.get_index_of(name)
    }

    /// Whether `name` is a dimension.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Dimension names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// `(name, values)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no dimensions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of each dimension.
    pub fn shape(&self) -> Shape {
        self.0.values().map(Vec::len).collect()
    }

    /// Dimension name to length.
    pub fn dims(&self) -> IndexMap<String, usize> {
        self.0.iter().map(|(k, v)| (k.clone(), v.len())).collect()
    }

    /// Coordinate values at the per-dimension positions.
    pub fn at(&self, coords: &[usize]) -> Vec<Value> {
        self.0
            .values()
            .zip(coords)
            .filter_map(|(values, &i)| values.get(i).cloned())
            .collect()
    }

    /// Coordinates retaining `positions[d]` of each dimension `d`.
    pub fn subset(&self, positions: &[Vec<usize>]) -> Self {
        Self(
            self.0
                .iter()
                .zip(positions)
                .map(|((k, values), keep)| {
                    let kept = keep.iter().filter_map(|&i| values.get(i).cloned()).collect();
                    (k.clone(), kept)
                })
                .collect(),
        )
    }

    /// Unwrap into the underlying map.
    pub fn into_inner(self) -> IndexMap<String, Vec<Value>> {
        self.0
    }
}

impl From<IndexMap<String, Vec<Value>>> for CubeCoords {
    fn from(map: IndexMap<String, Vec<Value>>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Vec<Value>)> for CubeCoords {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Value>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CubeCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coordinates:")?;
        let width = self.0.keys().map(String::len).max().unwrap_or(0) + 4;
        for (k, v) in &self.0 {
            writeln!(f, "  {k:<width$}{}", format_item(v))?;
        }
        Ok(())
    }
}

fn format_item(items: &[Value]) -> String {
    let Some(first) = items.first() else {
        return "??".to_string();
    };
    let join = |vs: &[Value]| {
        vs.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let body = if items.len() < DISPLAY_ITEMS {
        join(items)
    } else {
        let last = &items[items.len() - 1];
        format!("{} ,..., {last}", join(&items[..DISPLAY_ITEMS - 1]))
    };
    format!("[{}] {body}", first.type_name())
}
