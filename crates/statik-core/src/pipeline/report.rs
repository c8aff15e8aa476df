//! Outcome of a staging run.

use crate::manifest::RegisteredSet;
use crate::resolve::Closure;
use crate::stage::{ModuleFailure, StagedArtifact};

/// Everything a run did, in the order it happened.
#[derive(Debug)]
pub struct FreezeReport {
    /// The resolved module set.
    pub closure: Closure,

    /// Names whose disabled manifest line was enabled.
    pub activated: Vec<String>,

    /// Names already active in the manifest before the run.
    pub existing: Vec<String>,

    /// Modules staged and appended to the manifest.
    pub staged: Vec<StagedArtifact>,

    /// Modules that would be staged (dry runs only).
    pub planned: Vec<String>,

    /// Discovered dependencies that could not be located.
    pub skipped: Vec<String>,

    /// Modules that failed; the rest of the run went ahead.
    pub failures: Vec<ModuleFailure>,

    /// Every name registered or excluded by the end of the run.
    pub registered: RegisteredSet,

    /// Whether the manifest was written back.
    pub manifest_written: bool,
}

impl FreezeReport {
    pub(crate) fn new(closure: Closure, registered: RegisteredSet) -> Self {
        Self {
            closure,
            activated: Vec::new(),
            existing: Vec::new(),
            staged: Vec::new(),
            planned: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            registered,
            manifest_written: false,
        }
    }

    /// Whether every module was handled without failure.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether the run changed the manifest (or would, for a dry run).
    pub fn has_changes(&self) -> bool {
        !self.activated.is_empty() || !self.staged.is_empty() || !self.planned.is_empty()
    }

    /// Names of the failed modules.
    pub fn failed_modules(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.module.as_str()).collect()
    }
}
