//! Core engine for statik, the static module freezer.
//!
//! This crate provides:
//! - Module location across an ordered search context
//! - Dependency closure resolution and package traversal
//! - Staging of module sources (translation, native source lookup)
//! - Build manifest editing (`Modules/Setup`)

pub mod error;
pub mod locate;
pub mod manifest;
pub mod paths;
pub mod pipeline;
pub mod resolve;
pub mod stage;
pub mod tools;

pub use error::{Error, Result};
pub use locate::{ModuleKind, ModuleLocation, ModuleLocator, SearchContext, SourceOverrideMap};
pub use manifest::{Manifest, ManifestLine, RegisteredSet, Registration};
pub use paths::RuntimeDirs;
pub use pipeline::{FreezeConfig, FreezeReport, Freezer};
pub use resolve::{Closure, ClosureResolver, Origin, PackageWalker};
pub use stage::{ArtifactKind, Materializer, ModuleFailure, ModuleRequest, StagedArtifact};
pub use tools::{
    CythonTranspiler, FilesystemImporter, ModuleScanner, PackageImporter, PythonImporter,
    PythonInterpreter, PythonScanner, Transpiler,
};
