//! External collaborators of the staging pipeline.
//!
//! The pipeline only depends on the traits below. Implementations backed by
//! real tools:
//! - [`PythonScanner`]: `modulefinder` run by the host interpreter
//! - [`PythonImporter`]: live import and introspection of a package
//! - [`FilesystemImporter`]: package enumeration straight from disk
//! - [`CythonTranspiler`]: `cython` source-to-C translation

mod cython;
mod fs_importer;
mod python;

pub use cython::CythonTranspiler;
pub use fs_importer::FilesystemImporter;
pub use python::{PythonImporter, PythonInterpreter, PythonScanner};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::locate::SearchContext;

/// Computes the transitive import closure of a script or module file.
pub trait ModuleScanner {
    /// Names of every module `entry` imports, directly or indirectly.
    fn scan(&self, entry: &Path, search: &SearchContext) -> Result<BTreeSet<String>>;
}

/// Translates high-level source into a native translation unit.
pub trait Transpiler {
    /// Translate `source`, returning the generated native source file.
    fn translate(&self, source: &Path) -> Result<PathBuf>;
}

/// Imports packages and enumerates the modules they expose.
pub trait PackageImporter {
    /// Fully-qualified names of the module-valued members of `module`.
    ///
    /// An error means `module` itself could not be imported.
    fn members(&self, module: &str, search: &SearchContext) -> Result<Vec<String>>;
}
