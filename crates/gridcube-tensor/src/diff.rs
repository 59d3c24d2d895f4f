//! Metadata comparison used by the hypercube diagnostic.

use gridcube_core::Value;
use indexmap::IndexMap;

/// Relative tolerance for float comparison.
const REL_TOL: f64 = 1e-9;

/// Outcome of comparing two optional values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Compare {
    Same,
    Differ,
    TypeMismatch,
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Compare {
    match (a, b) {
        (None, None) => Compare::Same,
        (None, Some(_)) | (Some(_), None) => Compare::Differ,
        (Some(Value::Int(x)), Some(Value::Int(y))) => same_if(x == y),
        (Some(Value::Str(x)), Some(Value::Str(y))) => same_if(x == y),
        (Some(Value::Float(x)), Some(Value::Float(y))) => same_if(is_close(*x, *y)),
        _ => Compare::TypeMismatch,
    }
}

fn same_if(same: bool) -> Compare {
    if same {
        Compare::Same
    } else {
        Compare::Differ
    }
}

fn is_close(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= REL_TOL * a.abs().max(b.abs())
}

fn show(v: Option<&Value>) -> String {
    v.map_or_else(|| "None".to_string(), ToString::to_string)
}

// ── ListDiff ───────────────────────────────────────────────────────

/// First difference between two value lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListDiff {
    /// Whether the lists are equal.
    pub same: bool,
    /// Position of the first difference.
    pub diff_index: Option<usize>,
    /// Description of the first difference; empty when equal.
    pub diff_text: String,
}

impl ListDiff {
    /// Compare `a` with `b` element-wise; `name` labels the message.
    pub fn diff(name: &str, a: &[Option<Value>], b: &[Option<Value>]) -> Self {
        if a.len() != b.len() {
            return Self {
                same: false,
                diff_index: None,
                diff_text: format!("Length mismatch at {name}: {} != {}", a.len(), b.len()),
            };
        }
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            let text = match compare(x.as_ref(), y.as_ref()) {
                Compare::Same => continue,
                Compare::Differ => format!(
                    "Value mismatch at {name}[{i}]: {} != {}",
                    show(x.as_ref()),
                    show(y.as_ref())
                ),
                Compare::TypeMismatch => format!("Type mismatch at {name}[{i}]"),
            };
            return Self {
                same: false,
                diff_index: Some(i),
                diff_text: text,
            };
        }
        Self {
            same: true,
            diff_index: None,
            diff_text: String::new(),
        }
    }
}

// ── DictDiff ───────────────────────────────────────────────────────

/// All differences between two metadata maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictDiff {
    /// Whether the maps are equal.
    pub same: bool,
    /// One `key: a != b` line per differing key; empty when equal.
    pub diff_text: String,
}

impl DictDiff {
    /// Compare `a` with `b` over the union of their keys, `a`'s keys first.
    pub fn diff(a: &IndexMap<String, Value>, b: &IndexMap<String, Value>) -> Self {
        let keys = a.keys().chain(b.keys().filter(|k| !a.contains_key(*k)));
        let lines: Vec<String> = keys
            .filter_map(|k| {
                let (x, y) = (a.get(k), b.get(k));
                match compare(x, y) {
                    Compare::Same => None,
                    Compare::Differ => Some(format!("{k}: {} != {}", show(x), show(y))),
                    Compare::TypeMismatch => Some(format!(
                        "{k}: type mismatch {} != {}",
                        show(x),
                        show(y)
                    )),
                }
            })
            .collect();
        Self {
            same: lines.is_empty(),
            diff_text: lines.join("\n "),
        }
    }
}

/// Render `values` as `[a, b, c]`, eliding the middle beyond `n` items.
///
/// # Examples
///
/// ```
/// use gridcube_core::Value;
/// use gridcube_tensor::list_to_str;
///
/// let short: Vec<Value> = vec![850.into(), 1000.into()];
/// assert_eq!(list_to_str(&short, 10), "[850, 1000]");
///
/// let long: Vec<Value> = (0..12).map(Value::from).collect();
/// assert_eq!(list_to_str(&long, 10), "[0, 1, 2, 3, 4, 5, 6, 7, 8, ..., 11]");
/// ```
pub fn list_to_str(values: &[Value], n: usize) -> String {
    let join = |vs: &[Value]| {
        vs.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    match values.last() {
        Some(last) if values.len() > n && n > 0 => {
            format!("[{}, ..., {last}]", join(&values[..n - 1]))
        }
        _ => format!("[{}]", join(values)),
    }
}

/// Render a metadata map as `{k: v, ...}`.
pub fn map_to_str(map: &IndexMap<String, Value>) -> String {
    let body: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!("{{{}}}", body.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn list_first_difference() {
        let a = [Some(Value::from(1)), Some(Value::from("t"))];
        let b = [Some(Value::from(1)), Some(Value::from("r"))];
        let d = ListDiff::diff("coords", &a, &b);
        assert!(!d.same);
        assert_eq!(d.diff_index, Some(1));
        assert_eq!(d.diff_text, "Value mismatch at coords[1]: t != r");
    }

    #[test]
    fn list_type_mismatch() {
        let a = [Some(Value::from(850))];
        let b = [Some(Value::from("850"))];
        let d = ListDiff::diff("coords", &a, &b);
        assert_eq!(d.diff_text, "Type mismatch at coords[0]");
    }

    #[test]
    fn floats_compare_with_tolerance() {
        let a = [Some(Value::Float(1.0))];
        let b = [Some(Value::Float(1.0 + 1e-12))];
        assert!(ListDiff::diff("x", &a, &b).same);
        let c = [Some(Value::Float(1.001))];
        assert!(!ListDiff::diff("x", &a, &c).same);
    }

    #[test]
    fn dict_reports_each_key() {
        let a = map(&[("date", Value::from(20210101)), ("levtype", Value::from("pl"))]);
        let b = map(&[("date", Value::from(20210102)), ("step", Value::from(6))]);
        let d = DictDiff::diff(&a, &b);
        assert!(!d.same);
        assert_eq!(
            d.diff_text,
            "date: 20210101 != 20210102\n levtype: pl != None\n step: None != 6"
        );
        assert!(DictDiff::diff(&a, &a).same);
    }

    #[test]
    fn map_rendering() {
        let m = map(&[("param", Value::from("t")), ("levelist", Value::from(850))]);
        assert_eq!(map_to_str(&m), "{param: t, levelist: 850}");
    }
}
