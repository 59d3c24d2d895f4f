//! Dimension-selection configuration.
//!
//! [`DimsConfig`] is the input to [`Dims::new`](crate::Dims::new).
//! [`validate()`](DimsConfig::validate) checks the cross-option rules before
//! any dimension is built.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::ConfigError;

// ── DimRoles ───────────────────────────────────────────────────────

/// Maps dimension roles to the metadata keys that carry them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimRoles {
    /// Ensemble member key. Default: `"number"`.
    pub ens: String,
    /// Date key. Default: `"date"`.
    pub date: String,
    /// Time key. Default: `"time"`.
    pub time: String,
    /// Forecast step key. Default: `"step"`.
    pub step: String,
    /// Explicit reference-time key. Default: `None`, derived from `date`
    /// and `time`.
    pub forecast_reference_time: Option<String>,
    /// Vertical level key. Default: `"levelist"`.
    pub level: String,
    /// Level type key. Default: `"levtype"`.
    pub level_type: Option<String>,
}

impl DimRoles {
    /// Default level key.
    pub const DEFAULT_LEVEL: &'static str = "levelist";
    /// Default level-type key.
    pub const DEFAULT_LEVEL_TYPE: &'static str = "levtype";
}

impl Default for DimRoles {
    fn default() -> Self {
        Self {
            ens: "number".into(),
            date: "date".into(),
            time: "time".into(),
            step: "step".into(),
            forecast_reference_time: None,
            level: Self::DEFAULT_LEVEL.into(),
            level_type: Some(Self::DEFAULT_LEVEL_TYPE.into()),
        }
    }
}

// ── Modes ──────────────────────────────────────────────────────────

/// How time is represented in the dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeDimMode {
    /// Reference time plus forecast step.
    #[default]
    Forecast,
    /// A single absolute valid-time dimension.
    ValidTime,
    /// Separate `date`, `time` and `step` dimensions.
    Raw,
}

impl TimeDimMode {
    /// All modes, in registration order.
    pub const ALL: [TimeDimMode; 3] = [Self::Forecast, Self::ValidTime, Self::Raw];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Forecast => "forecast",
            Self::ValidTime => "valid_time",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for TimeDimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeDimMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ConfigError::UnknownTimeDimMode { name: s.to_string() })
    }
}

/// How vertical levels are represented in the dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LevelDimMode {
    /// One numeric level dimension.
    #[default]
    Level,
    /// One level dimension per level type, named after the type.
    LevelPerType,
    /// One dimension of concatenated level value and level type.
    LevelAndType,
}

impl LevelDimMode {
    /// All modes, in registration order.
    pub const ALL: [LevelDimMode; 3] = [Self::Level, Self::LevelPerType, Self::LevelAndType];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::LevelPerType => "level_per_type",
            Self::LevelAndType => "level_and_type",
        }
    }
}

impl fmt::Display for LevelDimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LevelDimMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ConfigError::UnknownLevelDimMode { name: s.to_string() })
    }
}

// ── DimsConfig ─────────────────────────────────────────────────────

/// Options controlling which metadata keys become dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimsConfig {
    /// Key whose distinct values become separate variables. Default: `"param"`.
    pub variable_key: String,
    /// Additional dimension keys, in priority order.
    pub extra_dims: Vec<String>,
    /// Keys that must never become dimensions.
    pub drop_dims: Vec<String>,
    /// Keys kept as dimensions even when they hold a single value.
    pub ensure_dims: Vec<String>,
    /// When non-empty, exactly these dimensions are used.
    pub fixed_dims: Vec<String>,
    /// Keys used to split the input; they are not dimensions.
    pub split_dims: Vec<String>,
    /// Role-to-key mapping.
    pub roles: DimRoles,
    /// Time representation. Default: forecast.
    pub time_dim_mode: TimeDimMode,
    /// Level representation. Default: level.
    pub level_dim_mode: LevelDimMode,
    /// Drop dimensions holding a single value. Default: true.
    pub squeeze: bool,
    /// Composite keys, `name -> template` (e.g. `"{param}_{level}"`).
    pub remapping: IndexMap<String, String>,
}

impl DimsConfig {
    /// Default variable key.
    pub const DEFAULT_VARIABLE_KEY: &'static str = "param";
    /// Default squeeze setting.
    pub const DEFAULT_SQUEEZE: bool = true;

    /// Check cross-option invariants.
    ///
    /// - `variable_key` is non-empty.
    /// - `fixed_dims` excludes `extra_dims` and `drop_dims`.
    /// - no key is in `drop_dims` and in `extra_dims` or `ensure_dims`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variable_key.is_empty() {
            return Err(ConfigError::EmptyVariableKey);
        }
        if !self.fixed_dims.is_empty() {
            if !self.extra_dims.is_empty() {
                return Err(ConfigError::FixedDimsExclusive {
                    option: "extra_dims",
                });
            }
            if !self.drop_dims.is_empty() {
                return Err(ConfigError::FixedDimsExclusive {
                    option: "drop_dims",
                });
            }
        }
        for key in &self.drop_dims {
            if self.extra_dims.contains(key) {
                return Err(ConfigError::ConflictingKey {
                    key: key.clone(),
                    first: "drop_dims",
                    second: "extra_dims",
                });
            }
            if self.ensure_dims.contains(key) {
                return Err(ConfigError::ConflictingKey {
                    key: key.clone(),
                    first: "drop_dims",
                    second: "ensure_dims",
                });
            }
        }
        Ok(())
    }

    /// Every metadata key named by the options and roles, in option order.
    ///
    /// Remapping names and templates are not included.
    pub fn metadata_keys(&self) -> impl Iterator<Item = &str> + '_ {
        let roles = &self.roles;
        std::iter::once(self.variable_key.as_str())
            .chain(self.extra_dims.iter().map(String::as_str))
            .chain(self.drop_dims.iter().map(String::as_str))
            .chain(self.ensure_dims.iter().map(String::as_str))
            .chain(self.fixed_dims.iter().map(String::as_str))
            .chain(self.split_dims.iter().map(String::as_str))
            .chain([
                roles.ens.as_str(),
                roles.date.as_str(),
                roles.time.as_str(),
                roles.step.as_str(),
                roles.level.as_str(),
            ])
            .chain(roles.forecast_reference_time.as_deref())
            .chain(roles.level_type.as_deref())
    }

    /// `drop_dims` extended with split keys not requested elsewhere.
    pub fn effective_drop_dims(&self) -> Vec<String> {
        let mut r = self.drop_dims.clone();
        for key in &self.split_dims {
            if !r.contains(key) && !self.extra_dims.contains(key) && !self.ensure_dims.contains(key)
            {
                r.push(key.clone());
            }
        }
        r
    }
}

impl Default for DimsConfig {
    fn default() -> Self {
        Self {
            variable_key: Self::DEFAULT_VARIABLE_KEY.into(),
            extra_dims: Vec::new(),
            drop_dims: Vec::new(),
            ensure_dims: Vec::new(),
            fixed_dims: Vec::new(),
            split_dims: Vec::new(),
            roles: DimRoles::default(),
            time_dim_mode: TimeDimMode::default(),
            level_dim_mode: LevelDimMode::default(),
            squeeze: Self::DEFAULT_SQUEEZE,
            remapping: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DimsConfig::default();
        assert_eq!(c.variable_key, "param");
        assert!(c.squeeze);
        assert_eq!(c.time_dim_mode, TimeDimMode::Forecast);
        assert_eq!(c.level_dim_mode, LevelDimMode::Level);
        assert_eq!(c.roles.level, "levelist");
        assert_eq!(c.roles.level_type.as_deref(), Some("levtype"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn mode_names_round_trip() {
        for m in TimeDimMode::ALL {
            assert_eq!(m.to_string().parse::<TimeDimMode>().unwrap(), m);
        }
        for m in LevelDimMode::ALL {
            assert_eq!(m.to_string().parse::<LevelDimMode>().unwrap(), m);
        }
    }

    #[test]
    fn unknown_mode_names() {
        assert_eq!(
            "hourly".parse::<TimeDimMode>(),
            Err(ConfigError::UnknownTimeDimMode {
                name: "hourly".into()
            })
        );
        assert_eq!(
            "flat".parse::<LevelDimMode>(),
            Err(ConfigError::UnknownLevelDimMode {
                name: "flat".into()
            })
        );
    }

    #[test]
    fn fixed_dims_exclusive() {
        let c = DimsConfig {
            fixed_dims: vec!["date".into()],
            extra_dims: vec!["number".into()],
            ..Default::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::FixedDimsExclusive {
                option: "extra_dims"
            })
        );
        let c = DimsConfig {
            fixed_dims: vec!["date".into()],
            drop_dims: vec!["number".into()],
            ..Default::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::FixedDimsExclusive {
                option: "drop_dims"
            })
        );
    }

    #[test]
    fn drop_conflicts() {
        let c = DimsConfig {
            drop_dims: vec!["step".into()],
            ensure_dims: vec!["step".into()],
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ConflictingKey {
                second: "ensure_dims",
                ..
            })
        ));
    }

    #[test]
    fn empty_variable_key() {
        let c = DimsConfig {
            variable_key: String::new(),
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::EmptyVariableKey));
    }

    #[test]
    fn split_dims_extend_drop_dims() {
        let c = DimsConfig {
            split_dims: vec!["class".into(), "number".into()],
            extra_dims: vec!["number".into()],
            ..Default::default()
        };
        assert_eq!(c.effective_drop_dims(), vec!["class".to_string()]);
    }
}
