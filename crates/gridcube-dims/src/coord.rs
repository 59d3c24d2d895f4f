//! Coordinate values of a realised dimension.

use chrono::{NaiveDateTime, TimeDelta};
use gridcube_core::dates::{step_to_delta, to_datetime};
use gridcube_core::{FieldList, Value};
use indexmap::IndexMap;

use crate::error::CoordError;
use crate::keys::LEVEL_TYPE_KEYS;

const DATETIME_NAMES: &[&str] = &[
    "forecast_reference_time",
    "date",
    "hdate",
    "andate",
    "valid_time",
    "valid_datetime",
    "base_datetime",
    "reference_time",
    "indexing_time",
];
const TIME_NAMES: &[&str] = &["time", "antime"];
const STEP_NAMES: &[&str] = &["step"];
const LEVEL_NAMES: &[&str] = &["level", "levelist"];

/// Semantic class of a coordinate, chosen from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoordKind {
    /// Dates and datetimes; decoded to calendar datetimes.
    DateTime,
    /// `hhmm` times; kept raw.
    Time,
    /// Forecast steps; decoded to durations.
    Step,
    /// Vertical levels; annotated with the level type.
    Level,
    /// Anything else.
    Other,
}

impl CoordKind {
    /// Classify a coordinate name.
    pub fn of(name: &str) -> Self {
        if DATETIME_NAMES.contains(&name) {
            Self::DateTime
        } else if TIME_NAMES.contains(&name) {
            Self::Time
        } else if STEP_NAMES.contains(&name) {
            Self::Step
        } else if LEVEL_NAMES.contains(&name) {
            Self::Level
        } else {
            Self::Other
        }
    }
}

/// A converted coordinate value.
#[derive(Clone, Debug, PartialEq)]
pub enum CoordValue {
    /// Value as read from metadata.
    Raw(Value),
    /// Decoded calendar datetime.
    DateTime(NaiveDateTime),
    /// Decoded duration.
    Duration(TimeDelta),
}

/// A named, ordered sequence of coordinate values.
///
/// # Examples
///
/// ```
/// use gridcube_core::{DictFieldList, Value};
/// use gridcube_dims::{Coord, CoordKind, CoordValue};
///
/// let c = Coord::make::<DictFieldList>("step", vec![Value::from(6), Value::from("90m")], None);
/// assert_eq!(c.kind(), CoordKind::Step);
/// let decoded = c.convert(true).unwrap();
/// assert_eq!(decoded[1], CoordValue::Duration(chrono::TimeDelta::minutes(90)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Coord {
    name: String,
    values: Vec<Value>,
    dims: Vec<String>,
    kind: CoordKind,
    level_type: IndexMap<String, Value>,
}

impl Coord {
    /// Build a coordinate, classifying it by `name`.
    ///
    /// Level coordinates sniff the level type from `source`: the single
    /// indexed value when the list indexes the key, else the first field's
    /// metadata. Sniffing never fails; absent keys are skipped.
    pub fn make<L: FieldList>(name: &str, values: Vec<Value>, source: Option<&L>) -> Self {
        let kind = CoordKind::of(name);
        let mut level_type = IndexMap::new();
        if let (CoordKind::Level, Some(ds)) = (kind, source) {
            for key in LEVEL_TYPE_KEYS {
                let v = match ds.indexed(key) {
                    Some(vals) => vals.into_iter().next(),
                    None => ds.metadata(0, key),
                };
                if let Some(v) = v {
                    level_type.insert(key.to_string(), v);
                }
            }
        }
        Self {
            name: name.to_string(),
            values,
            dims: vec![name.to_string()],
            kind,
            level_type,
        }
    }

    /// Coordinate name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Dimensions spanned by the coordinate: its own name.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Semantic class.
    pub fn kind(&self) -> CoordKind {
        self.kind
    }

    /// Sniffed level type per level-type key. Empty unless a level.
    pub fn level_type(&self) -> &IndexMap<String, Value> {
        &self.level_type
    }

    /// Values converted for output. With `decode`, datetimes and steps are
    /// parsed; everything else is returned raw.
    pub fn convert(&self, decode: bool) -> Result<Vec<CoordValue>, CoordError> {
        let err = |source| CoordError {
            name: self.name.clone(),
            source,
        };
        match (decode, self.kind) {
            (true, CoordKind::DateTime) => self
                .values
                .iter()
                .map(|v| to_datetime(v).map(CoordValue::DateTime).map_err(err))
                .collect(),
            (true, CoordKind::Step) => self
                .values
                .iter()
                .map(|v| step_to_delta(v).map(CoordValue::Duration).map_err(err))
                .collect(),
            _ => Ok(self.values.iter().cloned().map(CoordValue::Raw).collect()),
        }
    }

    /// Output attributes. Level coordinates carry their level type.
    pub fn attrs(&self) -> IndexMap<String, Value> {
        self.level_type.clone()
    }

    /// Output encoding hints. Decoded steps are stored as
    /// `timedelta64[s]`.
    pub fn encoding(&self, decode: bool) -> IndexMap<String, String> {
        let mut r = IndexMap::new();
        if decode && self.kind == CoordKind::Step {
            r.insert("dtype".to_string(), "timedelta64[s]".to_string());
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcube_core::{DictField, DictFieldList, FieldError};

    fn no_source(name: &str, values: Vec<Value>) -> Coord {
        Coord::make::<DictFieldList>(name, values, None)
    }

    #[test]
    fn classification() {
        assert_eq!(CoordKind::of("valid_time"), CoordKind::DateTime);
        assert_eq!(CoordKind::of("base_datetime"), CoordKind::DateTime);
        assert_eq!(CoordKind::of("reference_time"), CoordKind::DateTime);
        assert_eq!(CoordKind::of("antime"), CoordKind::Time);
        assert_eq!(CoordKind::of("levelist"), CoordKind::Level);
        assert_eq!(CoordKind::of("number"), CoordKind::Other);
    }

    #[test]
    fn step_decoding() {
        let c = no_source(
            "step",
            vec![Value::from(6), Value::from("6"), Value::from("6h"), Value::from("90m")],
        );
        let decoded = c.convert(true).unwrap();
        assert_eq!(
            decoded,
            vec![
                CoordValue::Duration(TimeDelta::hours(6)),
                CoordValue::Duration(TimeDelta::hours(6)),
                CoordValue::Duration(TimeDelta::hours(6)),
                CoordValue::Duration(TimeDelta::minutes(90)),
            ]
        );
        assert_eq!(c.encoding(true)["dtype"], "timedelta64[s]");
        assert!(c.encoding(false).is_empty());
    }

    #[test]
    fn unsupported_step_is_fatal() {
        let c = no_source("step", vec![Value::from("abc")]);
        let err = c.convert(true).unwrap_err();
        assert_eq!(err.name, "step");
        assert!(matches!(err.source, FieldError::UnsupportedStep { .. }));
        // raw conversion does not parse
        assert!(c.convert(false).is_ok());
    }

    #[test]
    fn datetime_decoding() {
        let c = no_source(
            "date",
            vec![Value::from("20210101"), Value::from(20210102)],
        );
        let decoded = c.convert(true).unwrap();
        match &decoded[1] {
            CoordValue::DateTime(dt) => assert_eq!(dt.to_string(), "2021-01-02 00:00:00"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(c.convert(false).unwrap()[0], CoordValue::Raw(Value::from("20210101")));
    }

    #[test]
    fn level_type_sniffed_from_first_field() {
        let ds = DictFieldList::from_fields(vec![DictField::from_pairs(
            [("levelist", Value::from(850)), ("levtype", Value::from("pl"))],
            vec![],
        )]);
        let c = Coord::make("levelist", vec![Value::from(850)], Some(&ds));
        assert_eq!(c.level_type().get("levtype"), Some(&Value::from("pl")));
        assert!(c.level_type().get("typeOfLevel").is_none());
        assert_eq!(c.attrs().len(), 1);
    }

    #[test]
    fn level_type_prefers_index() {
        let ds = DictFieldList::from_fields(vec![
            DictField::from_pairs([("typeOfLevel", "isobaricInhPa")], vec![]),
        ])
        .with_index_keys(["typeOfLevel"]);
        let c = Coord::make("level", vec![Value::from(850)], Some(&ds));
        assert_eq!(
            c.level_type().get("typeOfLevel"),
            Some(&Value::from("isobaricInhPa"))
        );
    }

    #[test]
    fn level_type_absent_is_not_an_error() {
        let ds = DictFieldList::from_fields(vec![DictField::from_pairs([("a", 1)], vec![])]);
        let c = Coord::make("levelist", vec![Value::from(1)], Some(&ds));
        assert!(c.level_type().is_empty());
        assert_eq!(c.dims(), &["levelist".to_string()]);
    }
}
