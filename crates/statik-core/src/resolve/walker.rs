//! Package traversal.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::locate::SearchContext;
use crate::tools::PackageImporter;

/// Enumerates every module reachable from a package.
pub struct PackageWalker<'a> {
    importer: &'a dyn PackageImporter,
}

impl<'a> PackageWalker<'a> {
    pub fn new(importer: &'a dyn PackageImporter) -> Self {
        Self { importer }
    }

    /// Fully-qualified names reachable from `package`, root first, each once.
    ///
    /// Every module-valued member is followed, including modules the package
    /// merely imports (`os`, `re`); see [`in_namespace`] to tell them apart.
    ///
    /// # Errors
    ///
    /// Fails only if `package` itself can't be imported. A member whose own
    /// enumeration fails is still returned; its children are skipped.
    pub fn walk(&self, package: &str, search: &SearchContext) -> Result<Vec<String>> {
        let root_members = self.importer.members(package, search)?;

        let mut visited = FxHashSet::default();
        visited.insert(package.to_string());
        let mut order = vec![package.to_string()];
        let mut worklist: VecDeque<String> = VecDeque::new();

        for member in root_members {
            if visited.insert(member.clone()) {
                worklist.push_back(member);
            }
        }

        while let Some(module) = worklist.pop_front() {
            order.push(module.clone());
            match self.importer.members(&module, search) {
                Ok(members) => {
                    for member in members {
                        if visited.insert(member.clone()) {
                            worklist.push_back(member);
                        }
                    }
                }
                Err(e) => tracing::warn!("Not descending into {}: {}", module, e),
            }
        }

        tracing::debug!("Package {} has {} modules", package, order.len());
        Ok(order)
    }
}

/// Whether `module` is `package` itself or one of its submodules.
pub fn in_namespace(package: &str, module: &str) -> bool {
    module
        .strip_prefix(package)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
