//! Staging of module sources into the runtime tree.
//!
//! - [`naming`]: flattening and destination rules
//! - [`Materializer`]: copies, translates and registers one module
//! - [`StagedArtifact`], [`ModuleFailure`], [`ModuleRequest`]: pipeline records

pub mod naming;
mod materializer;
mod types;

pub use materializer::{Materializer, has_own_registration, in_tree_source};
pub use types::{ArtifactKind, ModuleFailure, ModuleRequest, StagedArtifact};
