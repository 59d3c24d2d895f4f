//! The dimension selector.
//!
//! [`Dims::new`] runs in two phases. The first builds an immutable list of
//! candidate dimensions in declaration order:
//!
//! 1. the variable-key dimension,
//! 2. requested dimensions (`extra_dims` then `ensure_dims`): remapping
//!    dimensions first, then compound ones, then the rest in request order,
//! 3. core dimensions of the used modes (number, time, level),
//! 4. shadow dimensions of the unused modes, never active.
//!
//! The second walks the candidates once, in that order, over a separate
//! active-flag vector. A candidate that is still active when reached
//! deactivates every other active candidate matching its exclusion keys,
//! and every later one whose exclusion keys match it. Exclusion is thus
//! symmetric and the earlier of two conflicting candidates wins. The
//! variable-key candidate only applies its own exclusion keys.
//!
//! With `fixed_dims` the candidates are exactly the fixed keys, in the
//! given order, all of them ensured.

use std::collections::HashMap;
use std::sync::Arc;

use gridcube_core::dates::iso_datetime_patch;
use gridcube_core::{FieldList, MetadataKey, Remapped, Remapping, Value};
use indexmap::IndexMap;
use tracing::debug;

use crate::config::{DimRoles, DimsConfig};
use crate::coord::Coord;
use crate::dim::{Dim, DimKind};
use crate::error::DimError;
use crate::keys::KeyRegistry;
use crate::mode::{number_dims, register_forecast_keys};

/// Where a candidate dimension came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimOrigin {
    /// Built for the variable key. Never active after resolution.
    VariableKey,
    /// Requested through `extra_dims`, `ensure_dims` or `fixed_dims`.
    Requested,
    /// Contributed by a used time/level/number mode.
    Core,
    /// Contributed by an unused mode. Never active.
    Shadow,
}

#[derive(Clone, Debug)]
struct Candidate {
    dim: Dim,
    origin: DimOrigin,
}

/// The resolved dimension set for one selection run.
///
/// # Examples
///
/// ```
/// use gridcube_dims::{Dims, DimsConfig, TimeDimMode};
/// use gridcube_test_utils::ds_date_lev;
///
/// let config = DimsConfig {
///     time_dim_mode: TimeDimMode::Raw,
///     ..Default::default()
/// };
/// let (dims, _ds) = Dims::build(&config, ds_date_lev()).unwrap();
/// assert_eq!(dims.active_dim_keys(), vec!["date", "levelist"]);
/// ```
#[derive(Clone, Debug)]
pub struct Dims {
    candidates: Vec<Candidate>,
    active: Vec<bool>,
    variable_key: String,
    ensure_dims: Vec<String>,
    squeeze: bool,
    remapping: Arc<Remapping>,
    coords: HashMap<(String, Vec<Value>), Coord>,
}

impl Dims {
    /// Build and resolve the candidate dimensions of `config`.
    ///
    /// No field list is consulted; see [`update`](Self::update).
    pub fn new(config: &DimsConfig) -> Result<Self, DimError> {
        config.validate()?;
        for key in config.metadata_keys() {
            MetadataKey::parse(key)?;
        }

        let mut registry = KeyRegistry::new();
        register_forecast_keys(&config.roles, &mut registry);

        let mut remapping = Remapping::new();
        for (name, template) in &config.remapping {
            remapping.add(name.as_str(), template.as_str());
        }

        let (candidates, ensure_dims) = if config.fixed_dims.is_empty() {
            let c = declare(config, &registry, &remapping)?;
            (c, config.ensure_dims.clone())
        } else {
            if config.fixed_dims.contains(&config.variable_key) {
                return Err(DimError::VariableKeyAsDimension {
                    keys: vec![config.variable_key.clone()],
                    variable_key: config.variable_key.clone(),
                });
            }
            let c = config
                .fixed_dims
                .iter()
                .map(|k| Candidate {
                    dim: requested_dim(k, &config.roles, &registry, &remapping),
                    origin: DimOrigin::Requested,
                })
                .collect();
            (c, config.fixed_dims.clone())
        };

        for c in candidates.iter().filter(|c| c.origin != DimOrigin::Shadow) {
            register_template(&mut remapping, &c.dim);
        }

        let active = candidates
            .iter()
            .map(|c| c.origin != DimOrigin::Shadow)
            .collect();
        let mut dims = Self {
            candidates,
            active,
            variable_key: config.variable_key.clone(),
            ensure_dims,
            squeeze: config.squeeze,
            remapping: Arc::new(remapping),
            coords: HashMap::new(),
        };
        dims.resolve()?;
        Ok(dims)
    }

    /// Resolve `config` and reduce the dimensions against `ds`.
    ///
    /// Returns the dimensions and `ds` wrapped with the run's remapping, so
    /// composite keys read through it.
    pub fn build<L: FieldList>(
        config: &DimsConfig,
        ds: L,
    ) -> Result<(Self, Remapped<L>), DimError> {
        let mut dims = Self::new(config)?;
        let ds = Remapped::new(ds, dims.remapping());
        dims.update(&ds)?;
        debug!(keys = ?dims.active_dim_keys(), "active dimensions");
        Ok((dims, ds))
    }

    fn resolve(&mut self) -> Result<(), DimError> {
        for i in 0..self.candidates.len() {
            if !self.active[i] {
                continue;
            }
            let dim = &self.candidates[i].dim;
            if !dim.condition() {
                self.active[i] = false;
                debug!(dim = %dim.name, key = %dim.key, reason = "condition", "dimension deactivated");
                continue;
            }
            let exclusion = dim.exclusion_keys();
            let absorbs_only = self.candidates[i].origin == DimOrigin::VariableKey;
            for j in 0..self.candidates.len() {
                if j == i || !self.active[j] {
                    continue;
                }
                let other = &self.candidates[j].dim;
                let excluded = other.matches_any(&exclusion[..])
                    || (j > i && !absorbs_only && dim.matches_any(&other.exclusion_keys()[..]));
                if excluded {
                    self.active[j] = false;
                    debug!(
                        dim = %other.name,
                        key = %other.key,
                        reason = "conflict",
                        by = %self.candidates[i].dim.name,
                        "dimension deactivated"
                    );
                }
            }
        }

        // the variable dimension only serves to suppress what it absorbs
        for (c, active) in self.candidates.iter().zip(self.active.iter_mut()) {
            if c.origin == DimOrigin::VariableKey {
                *active = false;
            }
        }
        let clashing: Vec<String> = self
            .active_dims()
            .filter(|d| d.contains(&self.variable_key))
            .map(|d| d.name.clone())
            .collect();
        if !clashing.is_empty() {
            return Err(self.variable_key_error(clashing));
        }
        Ok(())
    }

    /// Deactivate dimensions that do not index `ds`.
    ///
    /// A dimension whose key has no value in `ds` is dropped. With
    /// `squeeze`, so is one with a single value unless its name or key is
    /// an ensured dimension.
    pub fn update<L: FieldList>(&mut self, ds: &L) -> Result<(), DimError> {
        for i in 0..self.candidates.len() {
            if !self.active[i] {
                continue;
            }
            let dim = &self.candidates[i].dim;
            if dim.contains(&self.variable_key) {
                return Err(self.variable_key_error(vec![dim.name.clone()]));
            }
            let count = ds
                .unique_values(&[dim.key.as_str()])
                .get(&dim.key)
                .map_or(0, Vec::len);
            let ensured = self.ensure_dims.iter().any(|k| *k == dim.name || *k == dim.key);
            let reason = match count {
                0 => Some("absent"),
                1 if self.squeeze && !ensured => Some("squeezed"),
                _ => None,
            };
            if let Some(reason) = reason {
                self.active[i] = false;
                debug!(dim = %dim.name, key = %dim.key, reason, "dimension deactivated");
            }
        }
        Ok(())
    }

    fn variable_key_error(&self, keys: Vec<String>) -> DimError {
        DimError::VariableKeyAsDimension {
            keys,
            variable_key: self.variable_key.clone(),
        }
    }

    /// The run's composite-key templates.
    pub fn remapping(&self) -> Arc<Remapping> {
        Arc::clone(&self.remapping)
    }

    /// The configured variable key.
    pub fn variable_key(&self) -> &str {
        &self.variable_key
    }

    /// Active dimensions in final order.
    pub fn active_dims(&self) -> impl Iterator<Item = &Dim> + '_ {
        self.candidates
            .iter()
            .zip(&self.active)
            .filter(|(_, a)| **a)
            .map(|(c, _)| &c.dim)
    }

    /// Metadata keys read per field to build the grid, in final order.
    pub fn active_dim_keys(&self) -> Vec<String> {
        self.active_dims().map(|d| d.key.clone()).collect()
    }

    /// Names of the active dimensions, in final order.
    pub fn names(&self) -> Vec<String> {
        self.active_dims().map(|d| d.name.clone()).collect()
    }

    /// Number of active dimensions.
    pub fn len(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Whether no dimension is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active dimension named `name`.
    pub fn get(&self, name: &str) -> Option<&Dim> {
        self.active_dims().find(|d| d.name == name)
    }

    /// Alternative dimensions of the unused modes.
    pub fn shadow_dims(&self) -> impl Iterator<Item = &Dim> + '_ {
        self.candidates
            .iter()
            .filter(|c| c.origin == DimOrigin::Shadow)
            .map(|c| &c.dim)
    }

    /// Every candidate with its origin and active flag, in declaration
    /// order.
    pub fn candidates(&self) -> impl Iterator<Item = (&Dim, DimOrigin, bool)> + '_ {
        self.candidates
            .iter()
            .zip(&self.active)
            .map(|(c, a)| (&c.dim, c.origin, *a))
    }

    /// Copies of the active dimensions.
    pub fn to_list(&self) -> Vec<Dim> {
        self.active_dims().cloned().collect()
    }

    /// Deactivate every active dimension containing one of `keys`.
    /// Returns the names of the deactivated dimensions.
    pub fn deactivate<S: AsRef<str>>(&mut self, keys: &[S]) -> Vec<String> {
        let mut names = Vec::new();
        for (c, active) in self.candidates.iter().zip(self.active.iter_mut()) {
            if *active && c.dim.matches_any(keys) {
                *active = false;
                names.push(c.dim.name.clone());
            }
        }
        names
    }

    /// [Deactivate](Self::deactivate) and forget the matching dimensions.
    pub fn remove<S: AsRef<str>>(&mut self, keys: &[S]) -> Vec<String> {
        let names = self.deactivate(keys);
        let mut active = std::mem::take(&mut self.active).into_iter();
        let mut kept_active = Vec::with_capacity(self.candidates.len());
        self.candidates.retain(|c| {
            let a = active.next().unwrap_or(false);
            let keep = c.origin == DimOrigin::Shadow || !names.contains(&c.dim.name);
            if keep {
                kept_active.push(a);
            }
            keep
        });
        self.active = kept_active;
        names
    }

    /// Coordinates for `user_coords`, keyed by coordinate name.
    ///
    /// Each entry is matched to the active dimension reading that key. A
    /// level-per-type dimension is named after the level type of the
    /// first field of `source`. Coordinates are cached per name and value
    /// set.
    pub fn as_coord<L: FieldList>(
        &mut self,
        user_coords: &IndexMap<String, Vec<Value>>,
        source: &L,
    ) -> Result<IndexMap<String, Coord>, DimError> {
        let mut r = IndexMap::new();
        for (key, values) in user_coords {
            let kind = self.active_dims().find(|d| d.key == *key).map(|d| d.kind.clone());
            let name = match kind {
                Some(DimKind::LevelPerType { level_type_key }) => {
                    let lt_key = level_type_key
                        .unwrap_or_else(|| DimRoles::DEFAULT_LEVEL_TYPE.to_string());
                    match source.metadata(0, &lt_key) {
                        Some(v) => v.to_string(),
                        None => return Err(DimError::LevelTypeMissing { key: lt_key }),
                    }
                }
                _ => key.clone(),
            };
            let coord = self
                .coords
                .entry((name.clone(), values.clone()))
                .or_insert_with(|| Coord::make(&name, values.clone(), Some(source)))
                .clone();
            r.insert(name, coord);
        }
        Ok(r)
    }
}

// ── Candidate declaration ──────────────────────────────────────────

fn requested_dim(key: &str, roles: &DimRoles, registry: &KeyRegistry, remapping: &Remapping) -> Dim {
    if remapping.contains(key) {
        Dim::remapping(key, remapping.keys(key), registry)
    } else {
        Dim::make(key, roles, registry)
    }
}

fn register_template(remapping: &mut Remapping, dim: &Dim) {
    if remapping.contains(&dim.name) {
        return;
    }
    let Some(template) = dim.remapping_template() else {
        return;
    };
    match dim.kind {
        DimKind::CustomForecastRef { .. } => {
            remapping.add_with_patch(dim.name.as_str(), template, iso_datetime_patch);
        }
        _ => remapping.add(dim.name.as_str(), template),
    }
}

fn declare(
    config: &DimsConfig,
    registry: &KeyRegistry,
    remapping: &Remapping,
) -> Result<Vec<Candidate>, DimError> {
    let roles = &config.roles;
    let drop_dims = config.effective_drop_dims();

    let mut candidates = vec![Candidate {
        dim: requested_dim(&config.variable_key, roles, registry, remapping),
        origin: DimOrigin::VariableKey,
    }];

    let mut keys: Vec<&String> = Vec::new();
    for k in config.extra_dims.iter().chain(&config.ensure_dims) {
        if !keys.contains(&k) && !drop_dims.contains(k) {
            keys.push(k);
        }
    }
    if let Some(k) = keys.iter().find(|k| ***k == config.variable_key) {
        return Err(DimError::VariableKeyAsDimension {
            keys: vec![(*k).clone()],
            variable_key: config.variable_key.clone(),
        });
    }
    let mut requested: Vec<Dim> = keys
        .iter()
        .map(|k| requested_dim(k, roles, registry, remapping))
        .collect();
    // remapping dims first, then compound ones, then the rest
    requested.sort_by_key(|d| match d.kind {
        DimKind::Remapping { .. } => 0,
        DimKind::Compound(_) => 1,
        _ => 2,
    });

    let modes = [
        number_dims(roles),
        config.time_dim_mode.dims(roles, registry),
        config.level_dim_mode.dims(roles, registry),
    ];
    let core: Vec<&Dim> = modes.iter().flat_map(|m| &m.used).collect();
    let shadow: Vec<&Dim> = modes.iter().flat_map(|m| &m.shadow).collect();

    let is_remapping = |name: &str| {
        requested
            .iter()
            .any(|d| d.name == name && matches!(d.kind, DimKind::Remapping { .. }))
    };

    // a request for a shadow name stays and competes in resolution
    for dim in &requested {
        if !matches!(dim.kind, DimKind::Remapping { .. })
            && core.iter().any(|c| c.name == dim.name)
        {
            debug!(dim = %dim.name, "requested dimension provided by a mode");
            continue;
        }
        candidates.push(Candidate {
            dim: dim.clone(),
            origin: DimOrigin::Requested,
        });
    }

    let seen = |candidates: &[Candidate], name: &str| candidates.iter().any(|c| c.dim.name == name);
    for dim in core {
        if seen(&candidates, &dim.name) || drop_dims.contains(&dim.name) || is_remapping(&dim.name)
        {
            continue;
        }
        candidates.push(Candidate {
            dim: dim.clone(),
            origin: DimOrigin::Core,
        });
    }
    for dim in shadow {
        if seen(&candidates, &dim.name) || is_remapping(&dim.name) {
            continue;
        }
        candidates.push(Candidate {
            dim: dim.clone(),
            origin: DimOrigin::Shadow,
        });
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LevelDimMode, TimeDimMode};
    use crate::error::ConfigError;
    use gridcube_test_utils::{ds_date_lev, ds_lev};

    fn raw() -> DimsConfig {
        DimsConfig {
            time_dim_mode: TimeDimMode::Raw,
            ..Default::default()
        }
    }

    #[test]
    fn declaration_order() {
        let dims = Dims::new(&DimsConfig::default()).unwrap();
        let order: Vec<(&str, DimOrigin)> = dims
            .candidates()
            .map(|(d, o, _)| (d.name.as_str(), o))
            .collect();
        assert_eq!(order[0], ("param", DimOrigin::VariableKey));
        assert_eq!(order[1], ("number", DimOrigin::Core));
        assert_eq!(order[2], ("forecast_reference_time", DimOrigin::Core));
        assert_eq!(order[3], ("step", DimOrigin::Core));
        assert_eq!(order[4], ("levelist", DimOrigin::Core));
        assert!(order[5..].iter().all(|(_, o)| *o == DimOrigin::Shadow));
        assert_eq!(
            dims.names(),
            vec!["number", "forecast_reference_time", "step", "levelist"]
        );
    }

    #[test]
    fn shadow_dims_never_active() {
        let dims = Dims::new(&DimsConfig::default()).unwrap();
        let shadow: Vec<&str> = dims.shadow_dims().map(|d| d.name.as_str()).collect();
        assert_eq!(shadow, vec!["valid_time", "date", "time", "_level_per_type", "level_and_type"]);
        assert!(dims
            .candidates()
            .filter(|(_, o, _)| *o == DimOrigin::Shadow)
            .all(|(_, _, a)| !a));
    }

    #[test]
    fn variable_key_requested_as_dimension() {
        let config = DimsConfig {
            extra_dims: vec!["param".into()],
            ..Default::default()
        };
        assert!(matches!(
            Dims::new(&config),
            Err(DimError::VariableKeyAsDimension { ref keys, .. }) if keys == &["param"]
        ));
    }

    #[test]
    fn variable_key_in_fixed_dims() {
        let config = DimsConfig {
            fixed_dims: vec!["date".into(), "param".into()],
            ..Default::default()
        };
        assert!(matches!(
            Dims::new(&config),
            Err(DimError::VariableKeyAsDimension { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DimsConfig {
            drop_dims: vec!["step".into()],
            extra_dims: vec!["step".into()],
            ..Default::default()
        };
        assert!(matches!(
            Dims::new(&config),
            Err(DimError::Config(ConfigError::ConflictingKey { .. }))
        ));
    }

    #[test]
    fn requested_shadow_name_competes() {
        let config = DimsConfig {
            extra_dims: vec!["valid_time".into(), "class".into()],
            ..Default::default()
        };
        let dims = Dims::new(&config).unwrap();
        assert_eq!(dims.names(), vec!["valid_time", "class", "number", "levelist"]);
        assert!(dims.get("forecast_reference_time").is_none());
        assert!(dims.get("step").is_none());
        let shadow: Vec<&str> = dims.shadow_dims().map(|d| d.name.as_str()).collect();
        assert!(!shadow.contains(&"valid_time"));
    }

    #[test]
    fn drop_dims_remove_core_dims() {
        let config = DimsConfig {
            drop_dims: vec!["number".into()],
            ..raw()
        };
        let dims = Dims::new(&config).unwrap();
        assert!(dims.get("number").is_none());
    }

    #[test]
    fn level_and_type_registers_template() {
        let config = DimsConfig {
            level_dim_mode: LevelDimMode::LevelAndType,
            ..Default::default()
        };
        let dims = Dims::new(&config).unwrap();
        assert_eq!(
            dims.remapping().template("level_and_type"),
            Some("{levelist}{levtype}")
        );
    }

    #[test]
    fn level_and_type_without_type_key_fails_condition() {
        let config = DimsConfig {
            level_dim_mode: LevelDimMode::LevelAndType,
            roles: DimRoles {
                level_type: None,
                ..Default::default()
            },
            ..Default::default()
        };
        let dims = Dims::new(&config).unwrap();
        assert!(dims.get("level_and_type").is_none());
    }

    #[test]
    fn update_squeezes_and_drops_absent() {
        let (dims, _) = Dims::build(&raw(), ds_lev()).unwrap();
        assert_eq!(dims.active_dim_keys(), vec!["levelist"]);

        let config = DimsConfig {
            squeeze: false,
            ..raw()
        };
        let (dims, _) = Dims::build(&config, ds_lev()).unwrap();
        assert_eq!(dims.active_dim_keys(), vec!["time", "step", "levelist"]);
    }

    #[test]
    fn ensure_dims_survive_squeeze() {
        let config = DimsConfig {
            ensure_dims: vec!["step".into()],
            ..raw()
        };
        let (dims, _) = Dims::build(&config, ds_date_lev()).unwrap();
        assert_eq!(dims.active_dim_keys(), vec!["date", "step", "levelist"]);
    }

    #[test]
    fn deactivate_and_remove() {
        let (mut dims, _) = Dims::build(&raw(), ds_date_lev()).unwrap();
        let snapshot = dims.to_list();
        assert_eq!(dims.remove(&["level"]), vec!["levelist"]);
        assert_eq!(dims.names(), vec!["date"]);
        assert_eq!(snapshot.len(), 2);
        assert!(dims.deactivate(&["levelist"]).is_empty());
        assert_eq!(dims.deactivate(&["date"]), vec!["date"]);
        assert!(dims.is_empty());
    }

    #[test]
    fn coords_are_cached_and_classified() {
        let (mut dims, ds) = Dims::build(&raw(), ds_date_lev()).unwrap();
        let mut user = IndexMap::new();
        user.insert("date".to_string(), vec![Value::from("20210101")]);
        user.insert(
            "levelist".to_string(),
            vec![Value::from(850), Value::from(1000)],
        );
        let coords = dims.as_coord(&user, &ds).unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords["levelist"].level_type()["levtype"], Value::from("pl"));
        let again = dims.as_coord(&user, &ds).unwrap();
        assert_eq!(coords, again);
        assert_eq!(dims.coords.len(), 2);
    }
}
