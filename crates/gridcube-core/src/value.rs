//! Scalar metadata values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A scalar metadata value read from a field.
///
/// Values carry a total order so that coordinate sequences can be
/// deduplicated and sorted deterministically: numbers (integers and
/// floats compared numerically) sort before strings, and strings compare
/// lexically. Equality and hashing agree with that order, so
/// `Int(850) == Float(850.0)`. Integers are compared with floats exactly,
/// never by rounding the integer to a float.
///
/// # Examples
///
/// ```
/// use gridcube_core::Value;
///
/// let mut levels = vec![Value::from(1000), Value::from(850), Value::from("sfc")];
/// levels.sort();
/// assert_eq!(levels, vec![Value::from(850), Value::from(1000), Value::from("sfc")]);
/// assert_eq!(Value::from(850), Value::from(850.0));
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    /// Integer value (e.g. `levelist`, `date`, `step`).
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value (e.g. `param`, `levtype`, ISO datetimes).
    Str(String),
}

impl Value {
    /// Short type tag used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
        }
    }

    /// Integer view of the value.
    ///
    /// Floats convert only when integral; strings are parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    Some(*v as i64)
                } else {
                    None
                }
            }
            Self::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Floating-point view of the value. Strings are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Borrow the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value is numeric (integer or float).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }
}

/// `2^63`, the first float above the `i64` range.
const I64_END: f64 = 9_223_372_036_854_775_808.0;

/// Integer part of `v` when it lies in the `i64` range.
fn float_trunc_i64(v: f64) -> Option<i64> {
    (v >= -I64_END && v < I64_END).then(|| v.trunc() as i64)
}

/// Exact comparison of an integer with a float.
///
/// The float is truncated to an integer instead of the integer being
/// rounded to a float, so integers above `2^53` stay distinct.
fn cmp_int_float(a: i64, b: f64) -> Ordering {
    if b.is_nan() {
        // total_cmp places NaN by sign, beyond the infinities.
        return 0f64.total_cmp(&b);
    }
    match float_trunc_i64(b) {
        Some(t) => a.cmp(&t).then_with(|| 0f64.total_cmp(&(b.fract() + 0.0))),
        None if b > 0.0 => Ordering::Less,
        None => Ordering::Greater,
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Str(_), _) => Ordering::Greater,
            (_, Self::Str(_)) => Ordering::Less,
            (Self::Int(a), Self::Float(b)) => cmp_int_float(*a, *b),
            (Self::Float(a), Self::Int(b)) => cmp_int_float(*b, *a).reverse(),
            // Adding 0.0 normalises -0.0 so it equals 0.0 and Int(0).
            (Self::Float(a), Self::Float(b)) => (a + 0.0).total_cmp(&(b + 0.0)),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Int(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            Self::Float(v) => {
                // Integral floats must hash like the equal Int.
                match float_trunc_i64(*v) {
                    Some(i) if v.fract() == 0.0 => {
                        0u8.hash(state);
                        i.hash(state);
                    }
                    _ => {
                        1u8.hash(state);
                        v.to_bits().hash(state);
                    }
                }
            }
            Self::Str(s) => {
                2u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn numbers_sort_before_strings() {
        let mut v = vec![
            Value::from("t"),
            Value::from(1000),
            Value::from(2.5),
            Value::from("r"),
            Value::from(850),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                Value::from(2.5),
                Value::from(850),
                Value::from(1000),
                Value::from("r"),
                Value::from("t"),
            ]
        );
    }

    #[test]
    fn integral_float_equals_and_hashes_like_int() {
        let mut set = HashSet::new();
        set.insert(Value::from(850));
        assert!(set.contains(&Value::from(850.0)));
        assert_ne!(Value::from(850.5), Value::from(850));
    }

    #[test]
    fn large_integers_compare_exactly_against_floats() {
        let big = 1i64 << 53;
        let f = Value::Float(big as f64);
        assert!(Value::Int(big) < Value::Int(big + 1));
        assert_eq!(Value::Int(big), f);
        assert_ne!(Value::Int(big + 1), f);
        assert!(f < Value::Int(big + 1));
        assert!(Value::Int(i64::MAX) < Value::Float(9_223_372_036_854_775_808.0));
        assert!(Value::Int(i64::MIN) == Value::Float(i64::MIN as f64));
        assert!(Value::Int(i64::MAX) < Value::Float(f64::INFINITY));
        assert!(Value::Float(f64::NEG_INFINITY) < Value::Int(i64::MIN));
        assert!(Value::Float(-2.5) < Value::Int(-2));
        assert!(Value::Int(-3) < Value::Float(-2.5));
        assert_eq!(Value::Float(-0.0), Value::Int(0));

        let mut sorted = vec![Value::Int(big + 1), f.clone(), Value::Int(big)];
        sorted.sort();
        assert_eq!(sorted[2], Value::Int(big + 1));
        let set: HashSet<Value> = sorted.into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_is_concatenation_form() {
        assert_eq!(Value::from(1000).to_string(), "1000");
        assert_eq!(Value::from("pl").to_string(), "pl");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from("12").as_i64(), Some(12));
        assert_eq!(Value::from(6.0).as_i64(), Some(6));
        assert_eq!(Value::from(6.5).as_i64(), None);
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(1).as_str(), None);
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            (-1000i64..1000).prop_map(Value::Int),
            (-1000i64..1000).prop_map(|v| Value::Float(v as f64 / 4.0)),
            ((1i64 << 53) - 4..(1i64 << 53) + 4).prop_map(Value::Int),
            ((1i64 << 53) - 4..(1i64 << 53) + 4).prop_map(|v| Value::Float(v as f64)),
            "[a-z]{0,4}".prop_map(Value::Str),
        ]
    }

    fn hash_of(v: &Value) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    proptest! {
        #[test]
        fn order_is_antisymmetric(a in arb_value(), b in arb_value()) {
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }

        #[test]
        fn order_is_transitive(a in arb_value(), b in arb_value(), c in arb_value()) {
            if a <= b && b <= c {
                prop_assert!(a <= c);
            }
        }

        #[test]
        fn equal_values_hash_alike(a in arb_value(), b in arb_value()) {
            if a == b {
                prop_assert_eq!(hash_of(&a), hash_of(&b));
            }
        }
    }
}
