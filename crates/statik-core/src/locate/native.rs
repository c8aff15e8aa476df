//! Native source lookup for prebuilt extension modules.
//!
//! A shared object can't be linked statically, so its original C/C++ source
//! has to be found. Candidate directories are probed in priority order:
//!
//! 1. source overrides whose package prefix matches the module
//! 2. the directory holding the shared object
//! 3. the general search context

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::stage::naming::{bare_stem, is_module_name};

use super::{NATIVE_SOURCE_SUFFIXES, SearchContext};

/// Mapping from package prefix to the directory holding its native sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOverrideMap {
    entries: BTreeMap<String, PathBuf>,
}

impl SourceOverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the source directory of a package.
    pub fn insert(&mut self, prefix: impl Into<String>, dir: impl Into<PathBuf>) {
        self.entries.insert(prefix.into(), dir.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Candidate directories for `module`, longest matching prefix first.
    ///
    /// For override `pkg -> D`, module `pkg.sub.mod` maps to `D/sub/mod` and
    /// then to its package directory `D/sub`.
    pub fn candidates(&self, module: &str) -> Vec<PathBuf> {
        let mut matches: Vec<(&String, &PathBuf)> = self
            .entries
            .iter()
            .filter(|(prefix, _)| {
                module == prefix.as_str()
                    || module
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('.'))
            })
            .collect();
        matches.sort_by_key(|(prefix, _)| std::cmp::Reverse(prefix.len()));

        let mut dirs = Vec::new();
        for (prefix, dir) in matches {
            let rest = module[prefix.len()..].trim_start_matches('.');
            let segments: Vec<&str> = rest.split('.').filter(|s| !s.is_empty()).collect();
            let full = segments.iter().fold(dir.clone(), |path, segment| path.join(segment));
            let parent = segments
                .iter()
                .take(segments.len().saturating_sub(1))
                .fold(dir.clone(), |path, segment| path.join(segment));
            for candidate in [full, parent] {
                if !dirs.contains(&candidate) {
                    dirs.push(candidate);
                }
            }
        }
        dirs
    }
}

impl FromStr for SourceOverrideMap {
    type Err = Error;

    /// Parse `pkg1:/path/to/src,pkg2:/path/to/src`.
    fn from_str(input: &str) -> Result<Self> {
        let mut map = Self::new();
        for item in input.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let Some((prefix, dir)) = item.split_once(':') else {
                return Err(Error::InvalidOverride(format!(
                    "'{item}' is not of the form package:/path"
                )));
            };
            let prefix = prefix.trim();
            if !is_module_name(prefix) {
                return Err(Error::InvalidOverride(format!(
                    "'{prefix}' is not a module name"
                )));
            }
            if dir.trim().is_empty() {
                return Err(Error::InvalidOverride(format!("empty directory for '{prefix}'")));
            }
            map.insert(prefix, dir.trim());
        }
        Ok(map)
    }
}

/// A native source file found for a prebuilt module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSource {
    /// The source file.
    pub path: PathBuf,
    /// Directory it was found in (added to the include path).
    pub dir: PathBuf,
}

/// Finds native sources for prebuilt extension modules.
pub struct NativeSourceFinder<'a> {
    overrides: &'a SourceOverrideMap,
    search: &'a SearchContext,
}

impl<'a> NativeSourceFinder<'a> {
    pub fn new(overrides: &'a SourceOverrideMap, search: &'a SearchContext) -> Self {
        Self { overrides, search }
    }

    /// Directories probed for `module`, in priority order.
    pub fn candidate_dirs(&self, module: &str, binary: &Path) -> Vec<PathBuf> {
        let mut dirs = self.overrides.candidates(module);
        if let Some(parent) = binary.parent() {
            dirs.push(parent.to_path_buf());
        }
        dirs.extend(self.search.dirs().iter().cloned());
        dirs
    }

    /// Find the native source of the prebuilt `binary` backing `module`.
    pub fn find(&self, module: &str, binary: &Path) -> Result<NativeSource> {
        let missing = || Error::MissingNativeSource {
            module: module.to_string(),
            binary: binary.to_path_buf(),
        };
        let stem = bare_stem(binary).ok_or_else(missing)?;

        for dir in self.candidate_dirs(module, binary) {
            for suffix in NATIVE_SOURCE_SUFFIXES {
                let candidate = dir.join(format!("{stem}{suffix}"));
                if candidate.is_file() {
                    tracing::debug!("Native source for {} at {}", module, candidate.display());
                    return Ok(NativeSource {
                        path: candidate,
                        dir,
                    });
                }
            }
        }

        Err(missing())
    }
}
