//! Module location on disk.
//!
//! This module provides:
//! - The ordered search context modules are probed in
//! - Module classification by file kind (package, source, extension, ...)
//! - The native-source finder for prebuilt extension modules

mod native;

pub use native::{NativeSource, NativeSourceFinder, SourceOverrideMap};

use std::fs;
use std::path::{Path, PathBuf};

use crate::stage::naming::{self, extension};

/// High-level source extensions that need translation.
pub const HIGH_LEVEL_EXTS: &[&str] = &["py", "pyx"];

/// Byte-compiled module extension.
pub const BYTECODE_EXT: &str = "pyc";

/// Prebuilt shared-object extensions.
pub const BINARY_EXTS: &[&str] = &["so", "pyd", "dylib"];

/// Extensions of directly compilable translation units.
pub const NATIVE_SOURCE_EXTS: &[&str] = &["c", "cc", "cpp", "cxx"];

/// Suffixes appended to a module stem when looking for its native source.
pub const NATIVE_SOURCE_SUFFIXES: &[&str] = &[".c", ".cpp", "module.c", "module.cpp"];

/// Ordered directories probed for module sources.
///
/// The context is only ever extended: script-relative and caller-supplied
/// directories are put in front of the existing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    dirs: Vec<PathBuf>,
}

impl SearchContext {
    /// Create a search context from directories in priority order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut context = Self::default();
        for dir in dirs {
            context.push(dir);
        }
        context
    }

    /// Append a directory with the lowest priority.
    pub fn push(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
    }

    /// Copy of this context with `dir` probed first.
    pub fn with_prepended(&self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut dirs = vec![dir.clone()];
        dirs.extend(self.dirs.iter().filter(|d| **d != dir).cloned());
        Self { dirs }
    }

    /// Directories in priority order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// How a module is realized on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Package directory; the location points at its initializer.
    Package,
    /// High-level source (`.py`, `.pyx`).
    Source,
    /// Byte-compiled module (`.pyc`).
    ByteCompiled,
    /// Prebuilt shared object.
    Extension,
    /// Native translation unit.
    NativeSource,
}

impl ModuleKind {
    /// Classify a module entry point by its file name.
    pub fn of_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if file_name.starts_with("__init__") {
            return Some(Self::Package);
        }

        let ext = extension(path)?;
        if HIGH_LEVEL_EXTS.contains(&ext) {
            Some(Self::Source)
        } else if ext == BYTECODE_EXT {
            Some(Self::ByteCompiled)
        } else if BINARY_EXTS.contains(&ext) {
            Some(Self::Extension)
        } else if NATIVE_SOURCE_EXTS.contains(&ext) {
            Some(Self::NativeSource)
        } else {
            None
        }
    }
}

/// A module resolved to its entry point on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    /// Fully-qualified module name.
    pub name: String,
    /// Entry point file (the initializer for packages).
    pub path: PathBuf,
    pub kind: ModuleKind,
}

impl ModuleLocation {
    /// Build a location from an explicit path.
    ///
    /// A package directory is accepted and resolved to its initializer.
    pub fn from_path(name: &str, path: &Path) -> Option<Self> {
        let path = if path.is_dir() {
            package_init(path)?
        } else {
            path.to_path_buf()
        };
        let kind = ModuleKind::of_path(&path)?;

        Some(Self {
            name: name.to_string(),
            path,
            kind,
        })
    }

    pub fn is_package(&self) -> bool {
        self.kind == ModuleKind::Package
    }

    /// Whether the dependency scanner can read this module's file.
    pub fn is_scannable(&self) -> bool {
        match self.kind {
            ModuleKind::ByteCompiled => true,
            ModuleKind::Source => extension(&self.path) == Some("py"),
            _ => false,
        }
    }

    /// File to hand to the scanner: the `.py` next to a `.pyc` when present.
    pub fn scan_entry(&self) -> PathBuf {
        if self.kind == ModuleKind::ByteCompiled {
            let source = self.path.with_extension("py");
            if source.is_file() {
                return source;
            }
        }
        self.path.clone()
    }
}

/// Finds modules in a [`SearchContext`].
///
/// Probe order inside one directory: package, extension module, `.py`,
/// `.pyx`, `.pyc`. The first directory with a hit wins.
#[derive(Debug, Clone)]
pub struct ModuleLocator {
    search: SearchContext,
}

impl ModuleLocator {
    pub fn new(search: SearchContext) -> Self {
        Self { search }
    }

    pub fn search(&self) -> &SearchContext {
        &self.search
    }

    /// Locate a (possibly dotted) module.
    pub fn locate(&self, name: &str) -> Option<ModuleLocation> {
        if !naming::is_module_name(name) {
            return None;
        }

        let segments: Vec<&str> = name.split('.').collect();
        let (leaf, parents) = segments.split_last()?;

        self.search.dirs().iter().find_map(|dir| {
            let mut base = dir.clone();
            for parent in parents {
                base.push(parent);
                package_init(&base)?;
            }
            probe(&base, leaf).map(|(path, kind)| ModuleLocation {
                name: name.to_string(),
                path,
                kind,
            })
        })
    }
}

/// Initializer of a package directory, if `dir` is one.
pub fn package_init(dir: &Path) -> Option<PathBuf> {
    ["py", "pyc", "pyx"]
        .iter()
        .map(|ext| dir.join(format!("__init__.{ext}")))
        .find(|init| init.is_file())
}

fn probe(dir: &Path, leaf: &str) -> Option<(PathBuf, ModuleKind)> {
    if let Some(init) = package_init(&dir.join(leaf)) {
        return Some((init, ModuleKind::Package));
    }

    if let Some(binary) = find_extension_module(dir, leaf) {
        return Some((binary, ModuleKind::Extension));
    }

    let candidates = [
        ("py", ModuleKind::Source),
        ("pyx", ModuleKind::Source),
        (BYTECODE_EXT, ModuleKind::ByteCompiled),
    ];
    candidates.iter().find_map(|(ext, kind)| {
        let path = dir.join(format!("{leaf}.{ext}"));
        path.is_file().then_some((path, *kind))
    })
}

/// Find `leaf.so` or an ABI-tagged variant such as `leaf.cpython-311-x86_64-linux-gnu.so`.
fn find_extension_module(dir: &Path, leaf: &str) -> Option<PathBuf> {
    for ext in BINARY_EXTS {
        let plain = dir.join(format!("{leaf}.{ext}"));
        if plain.is_file() {
            return Some(plain);
        }
    }

    let prefix = format!("{leaf}.");
    let mut tagged: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            file_name.starts_with(&prefix)
                && extension(path).is_some_and(|ext| BINARY_EXTS.contains(&ext))
                && path.is_file()
        })
        .collect();
    tagged.sort();
    tagged.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_search_context_extension() {
        let search = SearchContext::new(["Lib", "/usr/lib/python3"]);
        let extended = search.with_prepended("scripts");

        assert_eq!(
            extended.dirs(),
            &[
                PathBuf::from("scripts"),
                PathBuf::from("Lib"),
                PathBuf::from("/usr/lib/python3")
            ]
        );
        assert_eq!(search.dirs().len(), 2);
    }

    #[test]
    fn test_classify_paths() {
        assert_eq!(ModuleKind::of_path(Path::new("a/__init__.py")), Some(ModuleKind::Package));
        assert_eq!(ModuleKind::of_path(Path::new("a.pyx")), Some(ModuleKind::Source));
        assert_eq!(ModuleKind::of_path(Path::new("a.pyc")), Some(ModuleKind::ByteCompiled));
        assert_eq!(
            ModuleKind::of_path(Path::new("_a.cpython-311-x86_64-linux-gnu.so")),
            Some(ModuleKind::Extension)
        );
        assert_eq!(ModuleKind::of_path(Path::new("amodule.c")), Some(ModuleKind::NativeSource));
        assert_eq!(ModuleKind::of_path(Path::new("README.txt")), None);
    }

    #[test]
    fn test_locate_kinds() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path();
        touch(&lib.join("plain.py"));
        touch(&lib.join("compiled.pyc"));
        touch(&lib.join("_speedups.cpython-311-x86_64-linux-gnu.so"));
        touch(&lib.join("mypkg/__init__.py"));
        touch(&lib.join("mypkg/a.py"));
        touch(&lib.join("mypkg/sub/__init__.py"));
        touch(&lib.join("mypkg/sub/deep.pyx"));

        let locator = ModuleLocator::new(SearchContext::new([lib]));

        assert_eq!(locator.locate("plain").unwrap().kind, ModuleKind::Source);
        assert_eq!(locator.locate("compiled").unwrap().kind, ModuleKind::ByteCompiled);
        assert_eq!(locator.locate("_speedups").unwrap().kind, ModuleKind::Extension);

        let pkg = locator.locate("mypkg").unwrap();
        assert!(pkg.is_package());
        assert!(pkg.path.ends_with("mypkg/__init__.py"));

        assert_eq!(locator.locate("mypkg.a").unwrap().path, lib.join("mypkg/a.py"));
        assert_eq!(
            locator.locate("mypkg.sub.deep").unwrap().path,
            lib.join("mypkg/sub/deep.pyx")
        );
        assert!(locator.locate("mypkg.missing").is_none());
        assert!(locator.locate("plain.child").is_none());
        assert!(locator.locate("not-a-name").is_none());
    }

    #[test]
    fn test_locate_priority() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(&second.path().join("shadowed.py"));
        touch(&first.path().join("shadowed.pyc"));
        // A package beats a module of the same name in one directory.
        touch(&second.path().join("both/__init__.py"));
        touch(&second.path().join("both.py"));

        let locator = ModuleLocator::new(SearchContext::new([first.path(), second.path()]));

        let shadowed = locator.locate("shadowed").unwrap();
        assert_eq!(shadowed.kind, ModuleKind::ByteCompiled);
        assert!(locator.locate("both").unwrap().is_package());
    }

    #[test]
    fn test_scan_entry_prefers_source() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("mod.pyc"));
        touch(&temp.path().join("mod.py"));

        let location = ModuleLocation {
            name: "mod".into(),
            path: temp.path().join("mod.pyc"),
            kind: ModuleKind::ByteCompiled,
        };
        assert!(location.is_scannable());
        assert_eq!(location.scan_entry(), temp.path().join("mod.py"));

        let pyx = ModuleLocation {
            name: "fast".into(),
            path: temp.path().join("fast.pyx"),
            kind: ModuleKind::Source,
        };
        assert!(!pyx.is_scannable());
    }
}
