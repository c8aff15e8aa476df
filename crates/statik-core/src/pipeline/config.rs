//! Run configuration.

use std::path::PathBuf;

use crate::locate::{SearchContext, SourceOverrideMap};
use crate::paths::RuntimeDirs;

/// Configuration for one staging run.
#[derive(Debug, Clone)]
pub struct FreezeConfig {
    /// Layout of the runtime source tree being modified.
    pub dirs: RuntimeDirs,

    /// Directories modules are looked up in, highest priority first.
    pub search: SearchContext,

    /// Names never registered (the host module is always excluded).
    pub excluded: Vec<String>,

    /// Source directories of packages with prebuilt modules.
    pub overrides: SourceOverrideMap,

    /// Pull in the imports of every requested source module.
    pub deep: bool,

    /// Resolve and report without touching the staging tree or manifest.
    pub dry_run: bool,
}

impl Default for FreezeConfig {
    fn default() -> Self {
        Self::for_root(".")
    }
}

impl FreezeConfig {
    /// Config for the runtime tree at `root`, searching `<root>/Lib` only.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let dirs = RuntimeDirs::new(root);
        let search = SearchContext::new([dirs.lib_dir()]);
        Self {
            dirs,
            search,
            excluded: Vec::new(),
            overrides: SourceOverrideMap::new(),
            deep: false,
            dry_run: false,
        }
    }

    /// Config that only reports what a run would do.
    pub fn preview(root: impl Into<PathBuf>) -> Self {
        Self {
            dry_run: true,
            ..Self::for_root(root)
        }
    }

    /// Put `dirs` in front of the search context, keeping their order.
    pub fn with_search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs: Vec<PathBuf> = dirs.into_iter().map(Into::into).collect();
        for dir in dirs.into_iter().rev() {
            self.search = self.search.with_prepended(dir);
        }
        self
    }

    /// Append fallback directories, e.g. the interpreter's `sys.path`.
    pub fn with_fallback_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for dir in dirs {
            self.search.push(dir);
        }
        self
    }

    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_overrides(mut self, overrides: SourceOverrideMap) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
