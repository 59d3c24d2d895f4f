//! Time and level representation modes.
//!
//! Each axis has one used mode contributing core dimensions; the sibling
//! modes are built too, as inactive shadow dimensions kept for
//! introspection.

use crate::config::{DimRoles, LevelDimMode, TimeDimMode};
use crate::dim::{is_builtin_date_time, Dim, FORECAST_REFERENCE_TIME};
use crate::keys::{KeyGroup, KeyRegistry};

/// Dimensions contributed by one policy axis.
#[derive(Clone, Debug, Default)]
pub struct ModeDims {
    /// Dimensions of the selected mode, in registration order.
    pub used: Vec<Dim>,
    /// Dimensions of the other modes. Never active.
    pub shadow: Vec<Dim>,
}

/// Name of the reference-time dimension built by the forecast mode.
pub fn forecast_ref_name(roles: &DimRoles) -> String {
    match roles.forecast_reference_time.as_deref() {
        Some(r) => r.to_string(),
        None if is_builtin_date_time(&roles.date, &roles.time) => {
            FORECAST_REFERENCE_TIME.to_string()
        }
        None => Dim::custom_forecast_ref_name(&roles.date, &roles.time),
    }
}

/// Register the forecast reference-time and step keys so that every
/// dimension built afterwards treats them as datetime and step keys.
pub fn register_forecast_keys(roles: &DimRoles, registry: &mut KeyRegistry) {
    registry.register(KeyGroup::BaseDatetime, &forecast_ref_name(roles));
    registry.register(KeyGroup::Step, &roles.step);
}

impl TimeDimMode {
    /// Dimensions of this mode.
    pub fn build(self, roles: &DimRoles, registry: &KeyRegistry) -> Vec<Dim> {
        match self {
            Self::Forecast => {
                let ref_time = match roles.forecast_reference_time.as_deref() {
                    Some(FORECAST_REFERENCE_TIME) => Dim::forecast_ref_time(registry),
                    Some(r) => Dim::make(r, roles, registry),
                    None if is_builtin_date_time(&roles.date, &roles.time) => {
                        Dim::forecast_ref_time(registry)
                    }
                    None => Dim::custom_forecast_ref(&roles.date, &roles.time),
                };
                let step = Dim::make(&roles.step, roles, registry);
                vec![ref_time, step]
            }
            Self::ValidTime => vec![Dim::valid_time(registry)],
            Self::Raw => ["date", "time", "step"]
                .into_iter()
                .map(|k| Dim::make(k, roles, registry))
                .collect(),
        }
    }

    /// Used and shadow dimensions for this mode.
    pub fn dims(self, roles: &DimRoles, registry: &KeyRegistry) -> ModeDims {
        ModeDims {
            used: self.build(roles, registry),
            shadow: Self::ALL
                .into_iter()
                .filter(|m| *m != self)
                .flat_map(|m| m.build(roles, registry))
                .collect(),
        }
    }
}

impl LevelDimMode {
    /// Dimensions of this mode.
    pub fn build(self, roles: &DimRoles, registry: &KeyRegistry) -> Vec<Dim> {
        let level_type = roles.level_type.as_deref();
        let dim = match self {
            Self::Level => Dim::level(&roles.level),
            Self::LevelPerType => Dim::level_per_type(&roles.level, level_type, registry),
            Self::LevelAndType => Dim::level_and_type(&roles.level, level_type, registry),
        };
        vec![dim]
    }

    /// Used and shadow dimensions for this mode.
    pub fn dims(self, roles: &DimRoles, registry: &KeyRegistry) -> ModeDims {
        ModeDims {
            used: self.build(roles, registry),
            shadow: Self::ALL
                .into_iter()
                .filter(|m| *m != self)
                .flat_map(|m| m.build(roles, registry))
                .collect(),
        }
    }
}

/// The ensemble dimension. It has no alternatives.
pub fn number_dims(roles: &DimRoles) -> ModeDims {
    ModeDims {
        used: vec![Dim::number(&roles.ens)],
        shadow: Vec::new(),
    }
}
