//! Composite metadata keys synthesised from templates.
//!
//! A template such as `"{date}_{time}"` renders a new key from other keys.
//! A placeholder may list alternatives (`"{level|levelist}"`): the first one
//! present on the field is used.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::field::FieldList;
use crate::key::MetadataKey;
use crate::value::Value;

/// Post-processing applied to a rendered composite value.
pub type Patch = fn(&str) -> String;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Part {
    Literal(String),
    Key(Vec<String>),
}

#[derive(Clone)]
struct Entry {
    template: String,
    parts: Vec<Part>,
    patch: Option<Patch>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("template", &self.template)
            .field("patched", &self.patch.is_some())
            .finish()
    }
}

fn parse_template(template: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        if open > 0 {
            parts.push(Part::Literal(rest[..open].to_string()));
        }
        let inner = &rest[open + 1..open + close];
        parts.push(Part::Key(inner.split('|').map(str::to_string).collect()));
        rest = &rest[open + close + 1..];
    }
    if !rest.is_empty() {
        parts.push(Part::Literal(rest.to_string()));
    }
    parts
}

/// A set of composite-key templates, in registration order.
///
/// # Examples
///
/// ```
/// use gridcube_core::{Remapping, Value};
///
/// let mut r = Remapping::new();
/// r.add("level_and_type", "{levelist}{levtype}");
/// let lookup = |k: &str| match k {
///     "levelist" => Some(Value::from(850)),
///     "levtype" => Some(Value::from("pl")),
///     _ => None,
/// };
/// assert_eq!(r.render("level_and_type", lookup), Some(Value::from("850pl")));
/// assert_eq!(r.keys("level_and_type"), vec!["levelist", "levtype"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Remapping {
    entries: IndexMap<String, Entry>,
}

impl Remapping {
    /// Create an empty remapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as rendered from `template`. Re-registering replaces.
    pub fn add(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.insert(name.into(), template.into(), None);
    }

    /// Register `name` with a patch applied to the rendered string.
    pub fn add_with_patch(
        &mut self,
        name: impl Into<String>,
        template: impl Into<String>,
        patch: Patch,
    ) {
        self.insert(name.into(), template.into(), Some(patch));
    }

    fn insert(&mut self, name: String, template: String, patch: Option<Patch>) {
        let parts = parse_template(&template);
        self.entries.insert(
            name,
            Entry {
                template,
                parts,
                patch,
            },
        );
    }

    /// Whether no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `name` is a composite key.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered composite names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Template string registered for `name`.
    pub fn template(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.template.as_str())
    }

    /// Constituent keys of `name` in template order, alternatives included.
    pub fn keys(&self, name: &str) -> Vec<String> {
        let Some(entry) = self.entries.get(name) else {
            return Vec::new();
        };
        entry
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Key(alts) => Some(alts.iter().cloned()),
                Part::Literal(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Render `name` reading constituents through `lookup`.
    ///
    /// Missing constituents render as the empty string. Returns `None` when
    /// `name` is not registered or every constituent is missing.
    pub fn render<F>(&self, name: &str, lookup: F) -> Option<Value>
    where
        F: Fn(&str) -> Option<Value>,
    {
        let entry = self.entries.get(name)?;
        let mut out = String::new();
        let mut found = false;
        for part in &entry.parts {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Key(alts) => {
                    if let Some(v) = alts.iter().find_map(|k| lookup(k)) {
                        found = true;
                        out.push_str(&v.to_string());
                    }
                }
            }
        }
        if !found {
            return None;
        }
        Some(Value::Str(match entry.patch {
            Some(patch) => patch(&out),
            None => out,
        }))
    }
}

/// A [`FieldList`] that resolves composite keys before delegating.
#[derive(Clone, Debug)]
pub struct Remapped<L> {
    inner: L,
    remapping: Arc<Remapping>,
}

impl<L: FieldList> Remapped<L> {
    /// Wrap `inner` with `remapping`.
    pub fn new(inner: L, remapping: Arc<Remapping>) -> Self {
        Self { inner, remapping }
    }

    /// The wrapped list.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// The remapping consulted on lookups.
    pub fn remapping(&self) -> &Remapping {
        &self.remapping
    }
}

impl<L: FieldList> FieldList for Remapped<L> {
    type Field = L::Field;

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn get(&self, index: usize) -> Option<&L::Field> {
        self.inner.get(index)
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            inner: self.inner.select(indices),
            remapping: Arc::clone(&self.remapping),
        }
    }

    fn metadata(&self, index: usize, key: &str) -> Option<Value> {
        let parsed = MetadataKey::parse(key).ok()?;
        if !self.remapping.contains(&parsed.name) {
            return self.inner.metadata(index, key);
        }
        let value = self
            .remapping
            .render(&parsed.name, |k| self.inner.metadata(index, k))?;
        parsed.ty.cast(value)
    }

    fn indexed(&self, key: &str) -> Option<Vec<Value>> {
        if self.remapping.contains(key) {
            return None;
        }
        self.inner.indexed(key)
    }
}
