//! GRIB-style date, time and step decoding.
//!
//! GRIB encodes dates as `yyyymmdd` integers, times as `hhmm` integers and
//! forecast steps as hours, optionally with a unit suffix (`"90m"`).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::error::FieldError;
use crate::value::Value;

/// Seconds per step unit letter.
const STEP_UNIT_SECONDS: [(char, i64); 3] = [('s', 1), ('m', 60), ('h', 3600)];

const ISO_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Build a datetime from a `yyyymmdd` date and `hhmm` time.
///
/// # Examples
///
/// ```
/// use gridcube_core::dates::datetime_from_grib;
///
/// let dt = datetime_from_grib(20210101, 1200).unwrap();
/// assert_eq!(dt.to_string(), "2021-01-01 12:00:00");
/// ```
pub fn datetime_from_grib(date: i64, time: i64) -> Result<NaiveDateTime, FieldError> {
    let invalid = || FieldError::InvalidDate {
        value: format!("{date}_{time}"),
    };
    let year = i32::try_from(date / 10000).map_err(|_| invalid())?;
    let month = u32::try_from(date % 10000 / 100).map_err(|_| invalid())?;
    let day = u32::try_from(date % 100).map_err(|_| invalid())?;
    let hour = u32::try_from(time / 100).map_err(|_| invalid())?;
    let minute = u32::try_from(time % 100).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(invalid)
}

/// Split a datetime into GRIB `(yyyymmdd, hhmm)` integers.
pub fn datetime_to_grib(dt: &NaiveDateTime) -> (i64, i64) {
    let date = dt.format("%Y%m%d").to_string().parse().unwrap_or(0);
    let time = i64::from(dt.hour() * 100 + dt.minute());
    (date, time)
}

/// Decode a date or datetime value.
///
/// Accepts `yyyymmdd` integers or digit strings and ISO 8601 datetime or
/// date strings.
pub fn to_datetime(value: &Value) -> Result<NaiveDateTime, FieldError> {
    let invalid = || FieldError::InvalidDate {
        value: value.to_string(),
    };
    match value {
        Value::Int(d) => datetime_from_grib(*d, 0),
        Value::Float(d) if d.fract() == 0.0 => datetime_from_grib(*d as i64, 0),
        Value::Float(_) => Err(invalid()),
        Value::Str(s) => {
            let s = s.trim();
            if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
                let d = s.parse().map_err(|_| invalid())?;
                return datetime_from_grib(d, 0);
            }
            for fmt in ISO_FORMATS {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Ok(dt);
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(invalid)
        }
    }
}

/// Decode an `hhmm` time value.
pub fn to_time(value: &Value) -> Result<NaiveTime, FieldError> {
    let invalid = || FieldError::InvalidDate {
        value: value.to_string(),
    };
    let hhmm = value.as_i64().ok_or_else(invalid)?;
    let hour = u32::try_from(hhmm / 100).map_err(|_| invalid())?;
    let minute = u32::try_from(hhmm % 100).map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Decode a forecast step into a duration.
///
/// Supported encodings:
/// - integer: hours
/// - digits-only string: hours
/// - digits followed by one unit letter from `s`, `m`, `h`
///
/// # Examples
///
/// ```
/// use gridcube_core::dates::step_to_delta;
/// use gridcube_core::Value;
///
/// assert_eq!(step_to_delta(&Value::from("90m")).unwrap().num_minutes(), 90);
/// assert_eq!(step_to_delta(&Value::from(6)).unwrap().num_hours(), 6);
/// assert!(step_to_delta(&Value::from("abc")).is_err());
/// ```
pub fn step_to_delta(value: &Value) -> Result<TimeDelta, FieldError> {
    let unsupported = || FieldError::UnsupportedStep {
        value: value.to_string(),
    };
    let seconds = match value {
        Value::Int(hours) => hours.checked_mul(3600).ok_or_else(unsupported)?,
        Value::Float(_) => return Err(unsupported()),
        Value::Str(s) => {
            let (digits, unit) = match s.char_indices().last() {
                Some((pos, c)) if c.is_ascii_alphabetic() => (&s[..pos], Some(c)),
                _ => (s.as_str(), None),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(unsupported());
            }
            let count: i64 = digits.parse().map_err(|_| unsupported())?;
            let factor = match unit {
                None => 3600,
                Some(c) => STEP_UNIT_SECONDS
                    .iter()
                    .find(|(u, _)| *u == c)
                    .map(|(_, f)| *f)
                    .ok_or_else(|| FieldError::UnsupportedStepUnits {
                        value: s.clone(),
                    })?,
            };
            count.checked_mul(factor).ok_or_else(unsupported)?
        }
    };
    TimeDelta::try_seconds(seconds).ok_or_else(unsupported)
}

/// Rewrite a rendered `"yyyymmdd_hhmm"` composite as an ISO datetime.
///
/// Strings that do not decode are returned unchanged.
///
/// ```
/// use gridcube_core::dates::iso_datetime_patch;
///
/// assert_eq!(iso_datetime_patch("20210101_1200"), "2021-01-01T12:00:00");
/// assert_eq!(iso_datetime_patch("20210101_"), "20210101_");
/// ```
pub fn iso_datetime_patch(s: &str) -> String {
    let Some((date, time)) = s.split_once('_') else {
        return s.to_string();
    };
    match (date.parse(), time.parse()) {
        (Ok(d), Ok(t)) => datetime_from_grib(d, t)
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_else(|_| s.to_string()),
        _ => s.to_string(),
    }
}
