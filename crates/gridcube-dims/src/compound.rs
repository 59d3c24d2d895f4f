//! Compound keys: dimension names built by concatenating other keys.

/// A static composite-key declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompoundKey {
    /// Composite key name.
    pub name: &'static str,
    /// Constituent keys, in concatenation order.
    pub keys: &'static [&'static str],
}

const COMPOUND_KEYS: &[CompoundKey] = &[CompoundKey {
    name: "param_level",
    keys: &["param", "level", "levelist"],
}];

impl CompoundKey {
    /// Look up a registered compound key by name.
    pub fn make(name: &str) -> Option<&'static CompoundKey> {
        COMPOUND_KEYS.iter().find(|ck| ck.name == name)
    }

    /// Concatenation template for the remapping layer: one placeholder
    /// per constituent, in declared order, with no separator.
    ///
    /// Constituents that alias each other in the field metadata (`level`
    /// and `levelist`) both render, so the composite value repeats the
    /// level.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcube_dims::CompoundKey;
    ///
    /// let ck = CompoundKey::make("param_level").unwrap();
    /// assert_eq!(ck.template(), "{param}{level}{levelist}");
    /// ```
    pub fn template(&self) -> String {
        self.keys.iter().map(|k| format!("{{{k}}}")).collect()
    }

    /// `(name, template)` pair to register in a
    /// [`Remapping`](gridcube_core::Remapping).
    pub fn remapping(&self) -> (String, String) {
        (self.name.to_string(), self.template())
    }
}
