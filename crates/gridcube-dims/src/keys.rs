//! Metadata key tables and the per-run key registry.
//!
//! Each group lists keys that name the same physical concept under
//! different conventions. Dimension drop sets are derived from these
//! groups, so a run that introduces a new reference-time or step key
//! registers it before any dimension is built.

use indexmap::IndexMap;

/// Ensemble member keys.
pub const ENS_KEYS: &[&str] = &["number", "perturbationNumber", "realization"];
/// Vertical level keys.
pub const LEVEL_KEYS: &[&str] = &["level", "levelist", "topLevel", "bottomLevel", "levels"];
/// Level type keys.
pub const LEVEL_TYPE_KEYS: &[&str] = &["typeOfLevel", "levtype"];
/// Date keys (`yyyymmdd`).
pub const DATE_KEYS: &[&str] = &[
    "date",
    "andate",
    "validityDate",
    "dataDate",
    "hdate",
    "referenceDate",
    "indexingDate",
];
/// Time keys (`hhmm`).
pub const TIME_KEYS: &[&str] = &[
    "time",
    "antime",
    "validityTime",
    "dataTime",
    "referenceTime",
    "indexingTime",
];
/// Forecast step keys.
pub const STEP_KEYS: &[&str] = &["step", "endStep", "stepRange"];
/// Absolute valid-time keys.
pub const VALID_DATETIME_KEYS: &[&str] = &["valid_time", "valid_datetime"];
/// Reference (analysis/base) datetime keys.
pub const BASE_DATETIME_KEYS: &[&str] = &[
    "forecast_reference_time",
    "base_time",
    "base_datetime",
    "reference_time",
    "reference_datetime",
    "indexing_time",
    "indexing_datetime",
];

/// A family of equivalent metadata keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyGroup {
    /// [`ENS_KEYS`].
    Ens,
    /// [`LEVEL_KEYS`].
    Level,
    /// [`LEVEL_TYPE_KEYS`].
    LevelType,
    /// [`DATE_KEYS`].
    Date,
    /// [`TIME_KEYS`].
    Time,
    /// [`STEP_KEYS`].
    Step,
    /// [`VALID_DATETIME_KEYS`].
    ValidDatetime,
    /// [`BASE_DATETIME_KEYS`].
    BaseDatetime,
}

impl KeyGroup {
    /// All groups in table order.
    pub const ALL: [KeyGroup; 8] = [
        Self::Ens,
        Self::Level,
        Self::LevelType,
        Self::Date,
        Self::Time,
        Self::Step,
        Self::ValidDatetime,
        Self::BaseDatetime,
    ];

    /// The built-in keys of this group.
    pub fn defaults(self) -> &'static [&'static str] {
        match self {
            Self::Ens => ENS_KEYS,
            Self::Level => LEVEL_KEYS,
            Self::LevelType => LEVEL_TYPE_KEYS,
            Self::Date => DATE_KEYS,
            Self::Time => TIME_KEYS,
            Self::Step => STEP_KEYS,
            Self::ValidDatetime => VALID_DATETIME_KEYS,
            Self::BaseDatetime => BASE_DATETIME_KEYS,
        }
    }

    /// The built-in group containing `key`, if any.
    pub fn of(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.defaults().contains(&key))
    }
}

/// Key groups for one dimension-selection run.
///
/// Starts from the built-in tables; [`register`](Self::register) extends a
/// group without touching any process-wide state.
///
/// # Examples
///
/// ```
/// use gridcube_dims::{KeyGroup, KeyRegistry};
///
/// let mut reg = KeyRegistry::new();
/// reg.register(KeyGroup::BaseDatetime, "validity_time");
/// assert!(reg.datetime_keys().contains(&"validity_time".to_string()));
/// assert_eq!(reg.find_alias("levelist").len(), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRegistry {
    groups: IndexMap<KeyGroup, Vec<String>>,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyRegistry {
    /// Registry holding the built-in tables.
    pub fn new() -> Self {
        let groups = KeyGroup::ALL
            .into_iter()
            .map(|g| (g, g.defaults().iter().map(|k| k.to_string()).collect()))
            .collect();
        Self { groups }
    }

    /// Keys of `group`.
    pub fn keys(&self, group: KeyGroup) -> &[String] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append `key` to `group` unless already present.
    pub fn register(&mut self, group: KeyGroup, key: &str) {
        let keys = self.groups.entry(group).or_default();
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }

    /// Base followed by valid datetime keys.
    pub fn datetime_keys(&self) -> Vec<String> {
        let mut r = self.keys(KeyGroup::BaseDatetime).to_vec();
        r.extend_from_slice(self.keys(KeyGroup::ValidDatetime));
        r
    }

    /// Concatenation of `groups` with `exclude` removed.
    pub fn collect(&self, groups: &[KeyGroup], exclude: &str) -> Vec<String> {
        groups
            .iter()
            .flat_map(|g| self.keys(*g).iter())
            .filter(|k| *k != exclude)
            .cloned()
            .collect()
    }

    /// Every key of every group containing `key`.
    pub fn find_alias(&self, key: &str) -> Vec<String> {
        self.groups
            .values()
            .filter(|keys| keys.iter().any(|k| k == key))
            .flat_map(|keys| keys.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn group_lookup() {
        assert_eq!(KeyGroup::of("levtype"), Some(KeyGroup::LevelType));
        assert_eq!(KeyGroup::of("dataTime"), Some(KeyGroup::Time));
        assert_eq!(KeyGroup::of("param"), None);
    }

    #[test]
    fn register_is_idempotent() {
        let mut reg = KeyRegistry::new();
        let before = reg.keys(KeyGroup::Step).len();
        reg.register(KeyGroup::Step, "step");
        assert_eq!(reg.keys(KeyGroup::Step).len(), before);
        reg.register(KeyGroup::Step, "fcstep");
        assert_eq!(reg.keys(KeyGroup::Step).last().map(String::as_str), Some("fcstep"));
    }

    #[test]
    fn registries_are_independent() {
        let mut a = KeyRegistry::new();
        a.register(KeyGroup::BaseDatetime, "validity_time");
        let b = KeyRegistry::new();
        assert!(!b.keys(KeyGroup::BaseDatetime).iter().any(|k| k == "validity_time"));
    }

    #[test]
    fn collect_excludes_own_name() {
        let reg = KeyRegistry::new();
        let drop = reg.collect(&[KeyGroup::Date, KeyGroup::BaseDatetime], "date");
        assert!(!drop.iter().any(|k| k == "date"));
        assert!(drop.iter().any(|k| k == "forecast_reference_time"));
    }

    #[test]
    fn unknown_key_has_no_alias() {
        assert!(KeyRegistry::new().find_alias("param").is_empty());
    }

    proptest! {
        #[test]
        fn alias_contains_key(idx in 0usize..LEVEL_KEYS.len()) {
            let reg = KeyRegistry::new();
            let key = LEVEL_KEYS[idx];
            let alias = reg.find_alias(key);
            prop_assert!(alias.iter().any(|k| k == key));
            prop_assert_eq!(alias.len(), LEVEL_KEYS.len());
        }
    }
}
