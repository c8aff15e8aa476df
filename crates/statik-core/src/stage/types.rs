//! Common types for the staging pipeline.

use std::path::PathBuf;

use crate::error::Error;
use crate::manifest::Registration;

/// How a staged artifact was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// High-level source copied and translated to C.
    Translated,
    /// Native source copied as-is.
    NativeSource,
    /// Native source located for a prebuilt shared object, then copied.
    LocatedNativeSource,
    /// Native source already present in the runtime tree; nothing copied.
    InTree,
}

/// The build input materialized for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    /// Dotted module name.
    pub module: String,
    /// Flattened name used as the manifest build target.
    pub target_name: String,
    /// Path of the native source relative to `Modules/`, `/`-separated.
    pub relative_path: String,
    pub kind: ArtifactKind,
    /// Extra `-I<dir>` compiler flags.
    pub include_flags: Vec<String>,
}

impl StagedArtifact {
    /// The manifest registration for this artifact.
    pub fn registration(&self) -> Registration {
        Registration::new(
            self.target_name.clone(),
            self.relative_path.clone(),
            &self.include_flags,
        )
    }
}

/// A module whose materialization failed without aborting the run.
#[derive(Debug)]
pub struct ModuleFailure {
    pub module: String,
    pub error: Error,
}

/// A module name, optionally pinned to an explicit source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    pub name: String,
    pub source: Option<PathBuf>,
}

impl ModuleRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl std::str::FromStr for ModuleRequest {
    type Err = Error;

    /// Parse `name` or `name=path/to/source`.
    fn from_str(input: &str) -> Result<Self, Error> {
        let (name, source) = match input.split_once('=') {
            Some((name, source)) => (name.trim(), Some(source.trim())),
            None => (input.trim(), None),
        };

        if !super::naming::is_module_name(name) {
            return Err(Error::InvalidModuleName(input.to_string()));
        }

        let request = Self::new(name);
        Ok(match source {
            Some(source) if !source.is_empty() => request.with_source(source),
            _ => request,
        })
    }
}
