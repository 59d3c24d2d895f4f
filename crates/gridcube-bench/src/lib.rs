//! Benchmark profiles for gridcube.
//!
//! - [`reference_cube`]: 4 params x 10 dates x 4 steps x 13 levels (2080 fields)
//! - [`stress_cube`]: 8 params x 40 dates x 10 steps x 25 levels (80K fields)

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use gridcube_core::{DictFieldList, Value};
use gridcube_test_utils::{cartesian_fields, ints, strs, Column};

const PARAMS: [&str; 8] = ["t", "r", "u", "v", "z", "q", "w", "d"];

/// Build a forecast-like cube with the given dimension sizes.
///
/// Keys: `param`, `date` (consecutive days from 2021-01-01), `time`
/// (always 1200), `step` (6-hourly), `levelist` (1000 hPa downward).
pub fn cube(params: usize, dates: usize, steps: usize, levels: usize) -> DictFieldList {
    cartesian_fields(&cube_table(params, dates, steps, levels))
}

fn cube_table(params: usize, dates: usize, steps: usize, levels: usize) -> Vec<Column> {
    let params: Vec<&str> = PARAMS.iter().copied().cycle().take(params).collect();
    let dates: Vec<i64> = (0..dates as i64)
        .map(|d| 20210101 + (d / 28) * 100 + d % 28)
        .collect();
    let steps: Vec<i64> = (0..steps as i64).map(|s| s * 6).collect();
    let levels: Vec<i64> = (0..levels as i64).map(|l| 1000 - l * 25).collect();
    vec![
        ("param", strs(&params)),
        ("date", ints(&dates)),
        ("time", ints(&[1200])),
        ("step", ints(&steps)),
        ("levelist", ints(&levels)),
        ("levtype", strs(&["pl"])),
    ]
}

/// Reference profile: 2080 fields.
pub fn reference_cube() -> DictFieldList {
    cube(4, 10, 4, 13)
}

/// Stress profile: 80K fields.
pub fn stress_cube() -> DictFieldList {
    cube(8, 40, 10, 25)
}

/// Value of the first parameter, for selecting one variable.
pub fn first_param() -> Value {
    Value::from(PARAMS[0])
}
