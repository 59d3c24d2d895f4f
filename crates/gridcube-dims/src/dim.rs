//! Candidate dimensions.
//!
//! A [`Dim`] pairs a user-facing name with the metadata key it reads, plus
//! two key sets: `alias` (keys that mean the same thing) and `drop` (keys
//! whose dimensions must be deactivated while this one is active). The
//! kind set is closed; [`Dim::make`] picks a kind from the predefined name
//! table.

use crate::compound::CompoundKey;
use crate::config::DimRoles;
use crate::keys::{KeyGroup, KeyRegistry, ENS_KEYS, LEVEL_KEYS};

/// Name of the level-per-type dimension.
pub const LEVEL_PER_TYPE: &str = "_level_per_type";
/// Name of the level-and-type dimension.
pub const LEVEL_AND_TYPE: &str = "level_and_type";
/// Name of the built-in forecast reference time dimension.
pub const FORECAST_REFERENCE_TIME: &str = "forecast_reference_time";

const BUILTIN_DATES: &[&str] = &["date", "dataDate"];
const BUILTIN_TIMES: &[&str] = &["time", "dataTime"];

/// The kind of a candidate dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimKind {
    /// Ensemble member.
    Number,
    /// `yyyymmdd` date.
    Date,
    /// `hhmm` time.
    Time,
    /// Forecast step.
    Step,
    /// Absolute valid time.
    ValidTime,
    /// Built-in forecast reference time.
    ForecastRefTime,
    /// Reference time rendered from a custom date/time key pair.
    CustomForecastRef {
        /// Date key.
        date: String,
        /// Time key.
        time: String,
    },
    /// Numeric vertical level.
    Level,
    /// Level dimension named after the level type of the data.
    LevelPerType {
        /// Level-type key, if configured.
        level_type_key: Option<String>,
    },
    /// Concatenated level value and level type.
    LevelAndType {
        /// Level key.
        level_key: String,
        /// Level-type key, if configured.
        level_type_key: Option<String>,
    },
    /// A user-declared composite key.
    Remapping {
        /// Constituent keys.
        keys: Vec<String>,
    },
    /// A registered [`CompoundKey`].
    Compound(&'static CompoundKey),
    /// Any other metadata key.
    Other,
}

/// A candidate dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dim {
    /// Dimension name.
    pub name: String,
    /// Metadata key read from fields.
    pub key: String,
    /// Keys equivalent to `key`.
    pub alias: Vec<String>,
    /// Keys whose dimensions this one excludes.
    pub drop: Vec<String>,
    /// Dimension kind.
    pub kind: DimKind,
}

impl Dim {
    /// Build a dimension. `name` and `key` are removed from `alias` and
    /// `drop`, and duplicates are collapsed.
    pub fn new(
        name: impl Into<String>,
        key: impl Into<String>,
        alias: Vec<String>,
        drop: Vec<String>,
        kind: DimKind,
    ) -> Self {
        let name = name.into();
        let key = key.into();
        let clean = |v: Vec<String>| {
            let mut r: Vec<String> = Vec::with_capacity(v.len());
            for k in v {
                if k != name && k != key && !r.contains(&k) {
                    r.push(k);
                }
            }
            r
        };
        let alias = clean(alias);
        let drop = clean(drop);
        Self {
            name,
            key,
            alias,
            drop,
            kind,
        }
    }

    /// Dimension from the predefined table, falling back to a compound or
    /// a generic dimension.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcube_dims::{Dim, DimKind, DimRoles, KeyRegistry};
    ///
    /// let reg = KeyRegistry::new();
    /// let roles = DimRoles::default();
    /// let d = Dim::make("perturbationNumber", &roles, &reg);
    /// assert_eq!(d.kind, DimKind::Number);
    /// assert!(d.contains("realization"));
    /// assert_eq!(Dim::make("class", &roles, &reg).kind, DimKind::Other);
    /// ```
    pub fn make(name: &str, roles: &DimRoles, registry: &KeyRegistry) -> Self {
        if ENS_KEYS.contains(&name) {
            return Self::number(name);
        }
        if LEVEL_KEYS.contains(&name) {
            return Self::level(name);
        }
        match name {
            FORECAST_REFERENCE_TIME => Self::forecast_ref_time(registry),
            "date" => Self::date(registry),
            "time" => Self::time(registry),
            "step" => Self::step(name, registry),
            "valid_time" => Self::valid_time(registry),
            LEVEL_PER_TYPE => {
                Self::level_per_type(&roles.level, roles.level_type.as_deref(), registry)
            }
            LEVEL_AND_TYPE => {
                Self::level_and_type(&roles.level, roles.level_type.as_deref(), registry)
            }
            _ => match CompoundKey::make(name) {
                Some(ck) => Self::compound(ck, registry),
                None => Self::other(name),
            },
        }
    }

    /// Ensemble member dimension reading `key`.
    pub fn number(key: &str) -> Self {
        let alias = ENS_KEYS.iter().map(|k| k.to_string()).collect();
        Self::new(key, key, alias, Vec::new(), DimKind::Number)
    }

    /// `date` dimension.
    pub fn date(registry: &KeyRegistry) -> Self {
        let mut drop = registry.collect(&[KeyGroup::Date], "date");
        drop.extend(registry.datetime_keys());
        Self::new("date", "date", Vec::new(), drop, DimKind::Date)
    }

    /// `time` dimension.
    pub fn time(registry: &KeyRegistry) -> Self {
        let mut drop = registry.collect(&[KeyGroup::Time], "time");
        drop.extend(registry.datetime_keys());
        Self::new("time", "time", Vec::new(), drop, DimKind::Time)
    }

    /// Step dimension reading `key`.
    pub fn step(key: &str, registry: &KeyRegistry) -> Self {
        let drop = registry.collect(&[KeyGroup::Step, KeyGroup::ValidDatetime], key);
        Self::new(key, key, Vec::new(), drop, DimKind::Step)
    }

    /// `valid_time` dimension.
    pub fn valid_time(registry: &KeyRegistry) -> Self {
        let mut drop = registry.collect(&[KeyGroup::Date, KeyGroup::Time], "valid_time");
        drop.extend(registry.datetime_keys());
        Self::new("valid_time", "valid_time", Vec::new(), drop, DimKind::ValidTime)
    }

    /// `forecast_reference_time` dimension.
    pub fn forecast_ref_time(registry: &KeyRegistry) -> Self {
        let mut drop = registry.collect(&[KeyGroup::Date, KeyGroup::Time], FORECAST_REFERENCE_TIME);
        drop.extend(registry.datetime_keys());
        Self::new(
            FORECAST_REFERENCE_TIME,
            FORECAST_REFERENCE_TIME,
            vec!["base_datetime".into()],
            drop,
            DimKind::ForecastRefTime,
        )
    }

    /// Name of the composite reference-time key rendered from `date` and
    /// `time`: `validityDate` + `validityTime` gives `validity_time`,
    /// anything else `"{date}_{time}"`.
    pub fn custom_forecast_ref_name(date: &str, time: &str) -> String {
        match (date.strip_suffix("Date"), time.strip_suffix("Time")) {
            (Some(d), Some(t)) if d == t => format!("{d}_time"),
            _ => format!("{date}_{time}"),
        }
    }

    /// Reference time rendered from a non-standard date/time key pair.
    pub fn custom_forecast_ref(date: &str, time: &str) -> Self {
        let name = Self::custom_forecast_ref_name(date, time);
        Self::new(
            name.clone(),
            name,
            Vec::new(),
            vec![date.to_string(), time.to_string()],
            DimKind::CustomForecastRef {
                date: date.to_string(),
                time: time.to_string(),
            },
        )
    }

    /// Numeric level dimension reading `key`.
    pub fn level(key: &str) -> Self {
        let alias = LEVEL_KEYS.iter().map(|k| k.to_string()).collect();
        Self::new(key, key, alias, Vec::new(), DimKind::Level)
    }

    /// Level-per-type dimension reading `level_key`.
    pub fn level_per_type(
        level_key: &str,
        level_type_key: Option<&str>,
        registry: &KeyRegistry,
    ) -> Self {
        let drop = registry.collect(&[KeyGroup::Level, KeyGroup::LevelType], LEVEL_PER_TYPE);
        Self::new(
            LEVEL_PER_TYPE,
            level_key,
            Vec::new(),
            drop,
            DimKind::LevelPerType {
                level_type_key: level_type_key.map(str::to_string),
            },
        )
    }

    /// Level-and-type dimension. Reads the composite `level_and_type` key
    /// rendered by [`remapping_template`](Self::remapping_template).
    pub fn level_and_type(
        level_key: &str,
        level_type_key: Option<&str>,
        registry: &KeyRegistry,
    ) -> Self {
        let drop = registry.collect(&[KeyGroup::Level, KeyGroup::LevelType], LEVEL_AND_TYPE);
        Self::new(
            LEVEL_AND_TYPE,
            LEVEL_AND_TYPE,
            Vec::new(),
            drop,
            DimKind::LevelAndType {
                level_key: level_key.to_string(),
                level_type_key: level_type_key.map(str::to_string),
            },
        )
    }

    /// Dimension over a user-declared composite key. Drops every
    /// constituent and its aliases.
    pub fn remapping(name: &str, keys: Vec<String>, registry: &KeyRegistry) -> Self {
        let keys: Vec<String> = keys.into_iter().filter(|k| !k.is_empty()).collect();
        let drop = composite_drop(keys.iter().map(String::as_str), registry);
        Self::new(name, name, Vec::new(), drop, DimKind::Remapping { keys })
    }

    /// Dimension over a registered compound key.
    pub fn compound(ck: &'static CompoundKey, registry: &KeyRegistry) -> Self {
        let drop = composite_drop(ck.keys.iter().copied(), registry);
        Self::new(ck.name, ck.name, Vec::new(), drop, DimKind::Compound(ck))
    }

    /// Generic dimension reading `name`.
    pub fn other(name: &str) -> Self {
        Self::new(name, name, Vec::new(), Vec::new(), DimKind::Other)
    }

    /// Whether `key` is this dimension's name, key or one of its aliases.
    pub fn contains(&self, key: &str) -> bool {
        self.name == key || self.key == key || self.alias.iter().any(|a| a == key)
    }

    /// Whether any of `keys` is [contained](Self::contains).
    pub fn matches_any<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        keys.iter().any(|k| self.contains(k.as_ref()))
    }

    /// Keys whose dimensions are excluded while this one is active: the
    /// name, the key and the drop set.
    pub fn exclusion_keys(&self) -> Vec<String> {
        let mut r = vec![self.name.clone(), self.key.clone()];
        r.extend(self.drop.iter().cloned());
        r
    }

    /// Precondition checked before activation. Level-type dimensions need
    /// a configured level-type key.
    pub fn condition(&self) -> bool {
        match &self.kind {
            DimKind::LevelPerType { level_type_key } => level_type_key.is_some(),
            DimKind::LevelAndType { level_type_key, .. } => level_type_key.is_some(),
            _ => true,
        }
    }

    /// Remapping template this dimension needs registered, if any.
    pub fn remapping_template(&self) -> Option<String> {
        match &self.kind {
            DimKind::CustomForecastRef { date, time } => Some(format!("{{{date}}}_{{{time}}}")),
            DimKind::LevelAndType {
                level_key,
                level_type_key: Some(lt),
            } => Some(format!("{{{level_key}}}{{{lt}}}")),
            DimKind::Compound(ck) => Some(ck.template()),
            _ => None,
        }
    }
}

fn composite_drop<'a>(keys: impl Iterator<Item = &'a str>, registry: &KeyRegistry) -> Vec<String> {
    let mut r = Vec::new();
    for k in keys {
        r.push(k.to_string());
        r.extend(registry.find_alias(k));
    }
    r
}

/// Whether `date`/`time` follow the built-in GRIB convention, so the
/// reference time is the derived `forecast_reference_time` key.
pub fn is_builtin_date_time(date: &str, time: &str) -> bool {
    BUILTIN_DATES.contains(&date) && BUILTIN_TIMES.contains(&time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg() -> KeyRegistry {
        KeyRegistry::new()
    }

    #[test]
    fn name_and_key_never_in_own_sets() {
        let roles = DimRoles::default();
        let names = [
            "number",
            "date",
            "time",
            "step",
            "valid_time",
            "forecast_reference_time",
            "levelist",
            "level",
            LEVEL_PER_TYPE,
            LEVEL_AND_TYPE,
            "param_level",
            "class",
        ];
        for name in names {
            let d = Dim::make(name, &roles, &reg());
            assert!(!d.alias.contains(&d.name), "{name}");
            assert!(!d.alias.contains(&d.key), "{name}");
            assert!(!d.drop.contains(&d.name), "{name}");
            assert!(!d.drop.contains(&d.key), "{name}");
        }
    }

    #[test]
    fn date_excludes_reference_and_valid_time() {
        let d = Dim::date(&reg());
        for k in ["dataDate", "forecast_reference_time", "valid_time", "base_datetime"] {
            assert!(d.drop.iter().any(|x| x == k), "{k}");
        }
        assert!(!d.drop.iter().any(|x| x == "time"));
    }

    #[test]
    fn valid_time_excludes_date_and_time() {
        let d = Dim::valid_time(&reg());
        assert!(d.drop.iter().any(|x| x == "date"));
        assert!(d.drop.iter().any(|x| x == "time"));
        assert!(d.drop.iter().any(|x| x == "valid_datetime"));
    }

    #[test]
    fn forecast_ref_time_alias() {
        let d = Dim::forecast_ref_time(&reg());
        assert!(d.contains("base_datetime"));
        assert!(d.drop.iter().any(|x| x == "valid_time"));
    }

    #[test]
    fn custom_forecast_ref_names() {
        assert_eq!(
            Dim::custom_forecast_ref_name("validityDate", "validityTime"),
            "validity_time"
        );
        assert_eq!(
            Dim::custom_forecast_ref_name("indexingDate", "dataTime"),
            "indexingDate_dataTime"
        );
        let d = Dim::custom_forecast_ref("validityDate", "validityTime");
        assert_eq!(d.drop, vec!["validityDate", "validityTime"]);
        assert_eq!(
            d.remapping_template().as_deref(),
            Some("{validityDate}_{validityTime}")
        );
    }

    #[test]
    fn compound_drops_levels() {
        let d = Dim::make("param_level", &DimRoles::default(), &reg());
        assert!(matches!(d.kind, DimKind::Compound(_)));
        assert!(d.drop.iter().any(|x| x == "param"));
        assert!(d.drop.iter().any(|x| x == "topLevel"));
        assert!(Dim::level("levelist").matches_any(&d.drop[..]));
    }

    #[test]
    fn remapping_dim_skips_empty_keys() {
        let d = Dim::remapping("pl", vec!["param".into(), String::new()], &reg());
        assert_eq!(
            d.kind,
            DimKind::Remapping {
                keys: vec!["param".into()]
            }
        );
    }

    #[test]
    fn level_type_condition() {
        let r = reg();
        assert!(Dim::level_and_type("levelist", Some("levtype"), &r).condition());
        assert!(!Dim::level_and_type("levelist", None, &r).condition());
        assert!(!Dim::level_per_type("levelist", None, &r).condition());
        assert_eq!(
            Dim::level_and_type("levelist", Some("levtype"), &r)
                .remapping_template()
                .as_deref(),
            Some("{levelist}{levtype}")
        );
    }

    #[test]
    fn level_per_type_reads_level_key() {
        let d = Dim::level_per_type("levelist", Some("levtype"), &reg());
        assert_eq!(d.name, LEVEL_PER_TYPE);
        assert_eq!(d.key, "levelist");
        assert!(!d.drop.iter().any(|x| x == "levelist"));
        assert!(d.drop.iter().any(|x| x == "typeOfLevel"));
    }

    #[test]
    fn builtin_date_time() {
        assert!(is_builtin_date_time("dataDate", "time"));
        assert!(!is_builtin_date_time("validityDate", "validityTime"));
    }
}
