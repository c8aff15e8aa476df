//! Dependency closure resolution.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::locate::{ModuleLocator, SearchContext};
use crate::manifest::HOST_MODULE;
use crate::stage::naming::is_dotted;
use crate::tools::ModuleScanner;

/// Pseudo-module the scanner reports for the script itself.
const SCRIPT_MODULE: &str = "__main__";

/// Why a name is part of the closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Named by the caller.
    Requested,
    /// Found by scanning another module or the driver script.
    Discovered,
}

/// The resolved set of modules to stage.
#[derive(Debug, Clone)]
pub struct Closure {
    entries: BTreeMap<String, Origin>,
    search: SearchContext,
}

impl Closure {
    /// Search context the closure was resolved with.
    pub fn search(&self) -> &SearchContext {
        &self.search
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.entries.get(name).copied()
    }

    /// Names with their origin, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Origin)> {
        self.entries.iter().map(|(name, origin)| (name.as_str(), *origin))
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Expands requested module names into the full set to stage.
pub struct ClosureResolver<'a> {
    scanner: &'a dyn ModuleScanner,
}

impl<'a> ClosureResolver<'a> {
    pub fn new(scanner: &'a dyn ModuleScanner) -> Self {
        Self { scanner }
    }

    /// Resolve the closure of `names`.
    ///
    /// With a driver `script`, its imports seed the name set and resolution
    /// restarts without the script and without deep expansion. With `deep`,
    /// every pure-source module is scanned for its own imports. The host
    /// module and `excluded` names are dropped from the result.
    ///
    /// # Errors
    ///
    /// Fails if the driver script can't be scanned. Scans of individual
    /// modules in deep mode are best-effort.
    pub fn resolve(
        &self,
        names: &[String],
        script: Option<&Path>,
        deep: bool,
        search: &SearchContext,
        excluded: &[String],
    ) -> Result<Closure> {
        let entries = names
            .iter()
            .map(|name| (name.clone(), Origin::Requested))
            .collect();
        self.resolve_entries(entries, script, deep, search.clone(), excluded)
    }

    fn resolve_entries(
        &self,
        mut entries: BTreeMap<String, Origin>,
        script: Option<&Path>,
        deep: bool,
        search: SearchContext,
        excluded: &[String],
    ) -> Result<Closure> {
        if let Some(script) = script {
            let search = match script.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                Some(dir) => search.with_prepended(dir),
                None => search.with_prepended("."),
            };
            let imported = self.scanner.scan(script, &search)?;
            tracing::info!("{} imports {} modules", script.display(), imported.len());
            for name in imported {
                entries.entry(name).or_insert(Origin::Discovered);
            }
            return self.resolve_entries(entries, None, false, search, excluded);
        }

        if deep {
            let locator = ModuleLocator::new(search.clone());
            let requested: Vec<String> = entries.keys().cloned().collect();
            for name in requested {
                let Some(location) = locator.locate(&name) else {
                    continue;
                };
                if !location.is_scannable() {
                    continue;
                }
                match self.scanner.scan(&location.scan_entry(), &search) {
                    Ok(imported) => {
                        for dep in imported {
                            entries.entry(dep).or_insert(Origin::Discovered);
                        }
                    }
                    Err(e) => tracing::warn!("Skipping dependencies of {}: {}", name, e),
                }
            }
        }

        entries.remove(SCRIPT_MODULE);
        entries.remove(HOST_MODULE);
        for name in excluded {
            entries.remove(name);
        }

        Ok(Closure { entries, search })
    }
}

/// Fail on the first requested, undotted name that can't be located.
///
/// Dotted names are exempt: they may still be reachable through the package
/// importer. So are names `is_pinned` to an explicit source file.
pub fn check_requested(
    closure: &Closure,
    locator: &ModuleLocator,
    is_pinned: impl Fn(&str) -> bool,
) -> Result<()> {
    for (name, origin) in closure.iter() {
        if origin == Origin::Requested
            && !is_dotted(name)
            && !is_pinned(name)
            && locator.locate(name).is_none()
        {
            return Err(Error::ModuleNotFound(name.to_string()));
        }
    }
    Ok(())
}
