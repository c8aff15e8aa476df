//! Resolution of the module set to stage.
//!
//! - [`ClosureResolver`] expands requested names with their dependencies
//! - [`PackageWalker`] expands a package into its modules

mod closure;
mod walker;

pub use closure::{Closure, ClosureResolver, Origin, check_requested};
pub use walker::{PackageWalker, in_namespace};
