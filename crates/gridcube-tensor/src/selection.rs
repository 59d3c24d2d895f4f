//! Positional indexers and label selectors.
//!
//! Every indexer resolves to an explicit list of retained positions along
//! one dimension. A scalar index keeps its dimension with length one, so
//! subsetting never changes the number of user dimensions.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use gridcube_core::Value;

use crate::error::TensorError;

// ── Slice ──────────────────────────────────────────────────────────

/// A `start:stop:step` slice with negative-from-the-end bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slice {
    /// First position, default the start (or end for a negative step).
    pub start: Option<isize>,
    /// Exclusive bound, default the end (or start for a negative step).
    pub stop: Option<isize>,
    /// Stride, default 1. Zero is rejected on resolution.
    pub step: Option<isize>,
}

impl Slice {
    /// The slice selecting everything.
    pub const FULL: Self = Self {
        start: None,
        stop: None,
        step: None,
    };

    /// Slice `start..stop` with unit step.
    pub fn new(start: isize, stop: isize) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// The same slice with `step`.
    pub fn step_by(self, step: isize) -> Self {
        Self {
            step: Some(step),
            ..self
        }
    }

    /// Whether this slice selects everything in order.
    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && matches!(self.step, None | Some(1))
    }

    /// Positions selected in a dimension of length `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcube_tensor::Slice;
    ///
    /// assert_eq!(Slice::new(1, 10).positions(4).unwrap(), vec![1, 2, 3]);
    /// assert_eq!(Slice::FULL.step_by(-2).positions(5).unwrap(), vec![4, 2, 0]);
    /// assert_eq!(Slice::new(-2, -1).positions(5).unwrap(), vec![3]);
    /// ```
    pub fn positions(&self, len: usize) -> Result<Vec<usize>, TensorError> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(TensorError::ZeroSliceStep);
        }
        let len = isize::try_from(len).unwrap_or(isize::MAX);
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(b) if b < 0 => (b + len).max(lower),
            Some(b) => b.min(upper),
        };
        let start = clamp(self.start, if step > 0 { lower } else { upper });
        let stop = clamp(self.stop, if step > 0 { upper } else { lower });

        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            if let Ok(p) = usize::try_from(i) {
                out.push(p);
            }
            i += step;
        }
        Ok(out)
    }
}

impl From<Range<isize>> for Slice {
    fn from(r: Range<isize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<RangeFrom<isize>> for Slice {
    fn from(r: RangeFrom<isize>) -> Self {
        Self {
            start: Some(r.start),
            ..Self::FULL
        }
    }
}

impl From<RangeTo<isize>> for Slice {
    fn from(r: RangeTo<isize>) -> Self {
        Self {
            stop: Some(r.end),
            ..Self::FULL
        }
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::FULL
    }
}

// ── Indexer ────────────────────────────────────────────────────────

/// A positional selector for one user dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Indexer {
    /// A single position; negative counts from the end.
    Index(isize),
    /// A slice of positions.
    Slice(Slice),
    /// Explicit positions, in the given order.
    List(Vec<isize>),
    /// Everything remaining. Only accepted as the last indexer.
    Ellipsis,
}

impl Indexer {
    /// Indexer selecting the whole dimension.
    pub fn all() -> Self {
        Self::Slice(Slice::FULL)
    }

    /// Whether this indexer selects the whole dimension in order.
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Slice(s) if s.is_full())
    }

    /// Positions retained in dimension `dim` of length `len`.
    pub fn positions(&self, dim: &str, len: usize) -> Result<Vec<usize>, TensorError> {
        match self {
            Self::Index(i) => Ok(vec![wrap(dim, *i, len)?]),
            Self::Slice(s) => s.positions(len),
            Self::List(items) => items.iter().map(|&i| wrap(dim, i, len)).collect(),
            Self::Ellipsis => Ok((0..len).collect()),
        }
    }

    /// Pad `indexers` to `ndim` entries with full slices.
    ///
    /// A trailing [`Ellipsis`](Self::Ellipsis) is dropped before padding.
    /// More indexers than dimensions, or an ellipsis anywhere else, is an
    /// error.
    pub fn normalize(indexers: &[Indexer], ndim: usize) -> Result<Vec<Indexer>, TensorError> {
        let mut out: Vec<Indexer> = indexers.to_vec();
        if out.last() == Some(&Self::Ellipsis) {
            out.pop();
        }
        if let Some(position) = out.iter().position(|i| *i == Self::Ellipsis) {
            return Err(TensorError::MisplacedEllipsis { position });
        }
        if out.len() > ndim {
            return Err(TensorError::TooManyIndexers {
                got: out.len(),
                ndim,
            });
        }
        out.resize(ndim, Self::all());
        Ok(out)
    }
}

fn wrap(dim: &str, index: isize, len: usize) -> Result<usize, TensorError> {
    let out_of_bounds = || TensorError::IndexOutOfBounds {
        dim: dim.to_string(),
        index,
        len,
    };
    let signed_len = isize::try_from(len).map_err(|_| out_of_bounds())?;
    let i = if index < 0 { index + signed_len } else { index };
    if (0..signed_len).contains(&i) {
        usize::try_from(i).map_err(|_| out_of_bounds())
    } else {
        Err(out_of_bounds())
    }
}

impl From<isize> for Indexer {
    fn from(i: isize) -> Self {
        Self::Index(i)
    }
}

impl From<Slice> for Indexer {
    fn from(s: Slice) -> Self {
        Self::Slice(s)
    }
}

impl From<Range<isize>> for Indexer {
    fn from(r: Range<isize>) -> Self {
        Self::Slice(r.into())
    }
}

impl From<RangeFull> for Indexer {
    fn from(_: RangeFull) -> Self {
        Self::all()
    }
}

impl From<Vec<isize>> for Indexer {
    fn from(items: Vec<isize>) -> Self {
        Self::List(items)
    }
}

// ── Selector ───────────────────────────────────────────────────────

/// A label selector for one user dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Positions whose coordinate equals the value.
    One(Value),
    /// Positions whose coordinate is any of the values.
    Many(Vec<Value>),
}

impl Selector {
    /// Whether `value` is selected.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::One(v) => v == value,
            Self::Many(vs) => vs.contains(value),
        }
    }

    /// Positions in `coords` matching this selector, in coordinate order.
    pub fn positions(&self, coords: &[Value]) -> Vec<usize> {
        coords
            .iter()
            .enumerate()
            .filter(|(_, v)| self.matches(v))
            .map(|(i, _)| i)
            .collect()
    }
}

impl From<Value> for Selector {
    fn from(v: Value) -> Self {
        Self::One(v)
    }
}

impl From<i64> for Selector {
    fn from(v: i64) -> Self {
        Self::One(Value::Int(v))
    }
}

impl From<&str> for Selector {
    fn from(v: &str) -> Self {
        Self::One(Value::from(v))
    }
}

impl From<Vec<Value>> for Selector {
    fn from(vs: Vec<Value>) -> Self {
        Self::Many(vs)
    }
}
