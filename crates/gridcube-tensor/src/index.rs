//! Index translation between flat field positions and coordinate tuples.
//!
//! The user shape is enumerated in row-major order: the last dimension
//! varies fastest. A field list sorted by the dimension keys in order is
//! laid out the same way.

use smallvec::SmallVec;

/// Per-dimension positions of one field.
pub type CoordIndex = SmallVec<[usize; 4]>;

/// A tensor shape: user dimensions followed by field dimensions.
pub type Shape = SmallVec<[usize; 6]>;

/// Flat position of the coordinate tuple `coords` in `shape`.
///
/// # Examples
///
/// ```
/// use gridcube_tensor::coords_to_index;
///
/// assert_eq!(coords_to_index(&[1, 0, 2], &[2, 2, 3]), 8);
/// ```
pub fn coords_to_index(coords: &[usize], shape: &[usize]) -> usize {
    let mut index = 0;
    let mut stride = 1;
    for (c, n) in coords.iter().zip(shape).rev() {
        index += c * stride;
        stride *= n;
    }
    index
}

/// Coordinate tuple of the flat position `index` in `shape`.
pub fn index_to_coords(index: usize, shape: &[usize]) -> CoordIndex {
    let mut result: CoordIndex = SmallVec::from_elem(0, shape.len());
    let mut rest = index;
    for (slot, &n) in result.iter_mut().zip(shape).rev() {
        if n == 0 {
            continue;
        }
        *slot = rest % n;
        rest /= n;
    }
    result
}

/// Flat positions of the cartesian product of `positions`, first list
/// varying slowest.
///
/// An empty list anywhere yields no positions.
pub fn product_indices(positions: &[Vec<usize>], shape: &[usize]) -> Vec<usize> {
    if positions.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    let n = positions.len();
    let total: usize = positions.iter().map(Vec::len).product();
    let mut out = Vec::with_capacity(total);
    let mut cursor = vec![0usize; n];
    let mut coords: CoordIndex = SmallVec::from_elem(0, n);
    loop {
        for (i, &c) in cursor.iter().enumerate() {
            coords[i] = positions[i][c];
        }
        out.push(coords_to_index(&coords, shape));

        // advance, rightmost fastest
        let mut carry = true;
        for i in (0..n).rev() {
            if carry {
                cursor[i] += 1;
                if cursor[i] < positions[i].len() {
                    carry = false;
                } else {
                    cursor[i] = 0;
                }
            }
        }
        if carry {
            break;
        }
    }
    out
}
