//! End-to-end staging runs.
//!
//! [`Freezer`] drives one run from a [`FreezeConfig`] and returns a
//! [`FreezeReport`]:
//!
//! 1. Load the manifest and resolve the module closure
//! 2. Enable disabled manifest lines for requested modules
//! 3. Walk packages and materialize every remaining module
//! 4. Append registrations and write the manifest back

mod config;
mod freezer;
mod report;

pub use config::FreezeConfig;
pub use freezer::Freezer;
pub use report::FreezeReport;
