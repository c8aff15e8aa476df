//! Runtime source tree layout.
//!
//! Provides the fixed directory structure of the runtime being built, so the
//! CLI and the staging pipeline agree on where the manifest and the staged
//! module sources live.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory structure of a runtime source tree.
///
/// ```text
/// <root>/
/// ├── Lib/            # Pure-source standard library (searched first)
/// └── Modules/
///     ├── Setup       # Build manifest
///     └── extras/     # Staged module sources
///         └── <pkg>/  # Staged members of package <pkg>
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeDirs {
    /// The runtime source root.
    pub root: PathBuf,

    /// `Modules/`, the directory manifest paths are relative to.
    pub modules_dir: PathBuf,

    /// `Modules/extras/`, where staged artifacts are written.
    pub extras_dir: PathBuf,

    /// `Modules/Setup`, the build manifest.
    pub manifest_path: PathBuf,
}

/// Name of the staging directory inside `Modules/`.
pub const EXTRAS_DIR_NAME: &str = "extras";

impl RuntimeDirs {
    /// Derive the layout from the runtime root without touching the disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let modules_dir = root.join("Modules");
        let extras_dir = modules_dir.join(EXTRAS_DIR_NAME);
        let manifest_path = modules_dir.join("Setup");

        Self {
            root,
            modules_dir,
            extras_dir,
            manifest_path,
        }
    }

    /// The pure-source library directory of the runtime (`<root>/Lib`).
    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("Lib")
    }

    /// Fail with a configuration error when the manifest is missing.
    pub fn require_manifest(&self) -> Result<&Path> {
        if self.manifest_path.is_file() {
            Ok(&self.manifest_path)
        } else {
            Err(Error::ManifestNotFound(self.manifest_path.clone()))
        }
    }

    /// Staging directory for a module: `extras/` or `extras/<package-root>/`.
    pub fn staging_dir(&self, package_root: Option<&str>) -> PathBuf {
        match package_root {
            Some(root) => self.extras_dir.join(root),
            None => self.extras_dir.clone(),
        }
    }

    /// Create the staging directory for a module if it doesn't exist.
    pub fn ensure_staging_dir(&self, package_root: Option<&str>) -> Result<PathBuf> {
        let dir = self.staging_dir(package_root);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
