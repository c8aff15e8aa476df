//! Names already known to the manifest.

use rustc_hash::FxHashSet;

/// The runtime's own identifier module, always built in.
pub const HOST_MODULE: &str = "sys";

/// Set of module names that must not be registered again.
///
/// Seeded with [`HOST_MODULE`] and the caller's exclusions; grows during a run
/// and never shrinks. Keyed on module names as given: `a.b` and a top-level
/// `a__b` are different modules even though both register as `a__b`.
#[derive(Debug, Clone)]
pub struct RegisteredSet {
    names: FxHashSet<String>,
}

impl RegisteredSet {
    /// Create a set holding the host module and `excluded`.
    pub fn seeded<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = FxHashSet::default();
        names.insert(HOST_MODULE.to_string());
        names.extend(excluded.into_iter().map(Into::into));
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Insert a name; returns `false` if it was already registered.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for RegisteredSet {
    fn default() -> Self {
        Self::seeded(std::iter::empty::<String>())
    }
}
