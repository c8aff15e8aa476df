//! The staging pipeline.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::locate::ModuleLocator;
use crate::manifest::{Manifest, RegisteredSet, write_manifest};
use crate::resolve::{ClosureResolver, Origin, PackageWalker, check_requested, in_namespace};
use crate::stage::naming::is_dotted;
use crate::stage::{Materializer, ModuleFailure, ModuleRequest, in_tree_source};
use crate::tools::{ModuleScanner, PackageImporter, Transpiler};

use super::{FreezeConfig, FreezeReport};

/// Runs the full pipeline: resolve, activate, stage, register, save.
pub struct Freezer<'a> {
    config: FreezeConfig,
    scanner: &'a dyn ModuleScanner,
    transpiler: &'a dyn Transpiler,
    importer: &'a dyn PackageImporter,
}

/// Mutable state of one run.
struct RunState<'m> {
    manifest: Manifest,
    materializer: Materializer<'m>,
    report: FreezeReport,
}

impl<'a> Freezer<'a> {
    pub fn new(
        config: FreezeConfig,
        scanner: &'a dyn ModuleScanner,
        transpiler: &'a dyn Transpiler,
        importer: &'a dyn PackageImporter,
    ) -> Self {
        Self {
            config,
            scanner,
            transpiler,
            importer,
        }
    }

    pub fn config(&self) -> &FreezeConfig {
        &self.config
    }

    /// Stage `requests` and, with `script`, everything the script imports.
    ///
    /// # Errors
    ///
    /// Only configuration errors are returned: a missing manifest, a driver
    /// script that can't be scanned, a requested module found nowhere, or an
    /// I/O failure writing the manifest. Per-module failures are collected in
    /// [`FreezeReport::failures`].
    pub fn run(&self, requests: &[ModuleRequest], script: Option<&Path>) -> Result<FreezeReport> {
        let config = &self.config;
        let manifest = Manifest::load(&config.dirs.manifest_path)?;

        let names: Vec<String> = requests.iter().map(|r| r.name.clone()).collect();
        let pinned: FxHashMap<&str, &Path> = requests
            .iter()
            .filter_map(|r| r.source.as_deref().map(|source| (r.name.as_str(), source)))
            .collect();

        let closure = ClosureResolver::new(self.scanner).resolve(
            &names,
            script,
            config.deep,
            &config.search,
            &config.excluded,
        )?;
        tracing::info!("Resolved {} modules", closure.len());

        let locator = ModuleLocator::new(closure.search().clone());
        // Names with a manifest line or an in-tree source need no library file.
        check_requested(&closure, &locator, |name| {
            pinned.contains_key(name)
                || manifest.has_registration(name)
                || in_tree_source(&config.dirs.modules_dir, name).is_some()
        })?;

        let registered = RegisteredSet::seeded(config.excluded.iter().cloned());
        let mut state = RunState {
            manifest,
            materializer: Materializer::new(
                &config.dirs,
                &locator,
                &config.overrides,
                self.transpiler,
            ),
            report: FreezeReport::new(closure.clone(), registered),
        };

        for (name, _) in closure.iter() {
            if state.manifest.activate(name, &mut state.report.registered) {
                state.report.activated.push(name.to_string());
            }
        }
        state.report.existing = state
            .manifest
            .scan_active_names(&locator, &mut state.report.registered);

        let walker = PackageWalker::new(self.importer);
        for (name, origin) in closure.iter() {
            if state.report.registered.contains(name) {
                continue;
            }

            if let Some(&source) = pinned.get(name) {
                self.stage(&mut state, name, Some(source), origin)?;
                continue;
            }

            match locator.locate(name) {
                Some(location) if location.is_package() => {
                    self.walk(&mut state, &walker, &locator, name, origin)?;
                }
                None if origin == Origin::Requested && is_dotted(name) => {
                    self.walk(&mut state, &walker, &locator, name, origin)?;
                }
                _ => self.stage(&mut state, name, None, origin)?,
            }
        }

        let RunState {
            manifest,
            mut report,
            ..
        } = state;

        let changed = !report.activated.is_empty() || manifest.appended() > 0;
        if changed && !config.dry_run {
            write_manifest(&manifest)?;
            report.manifest_written = true;
            tracing::info!("Updated {}", manifest.path().display());
        }

        Ok(report)
    }

    /// Stage every module reachable from `package`.
    ///
    /// Members outside the package namespace are staged as discovered
    /// dependencies, so an unresolvable one is skipped rather than failed.
    fn walk(
        &self,
        state: &mut RunState<'_>,
        walker: &PackageWalker<'_>,
        locator: &ModuleLocator,
        package: &str,
        origin: Origin,
    ) -> Result<()> {
        match walker.walk(package, locator.search()) {
            Ok(modules) => {
                for module in modules {
                    let origin = if in_namespace(package, &module) {
                        origin
                    } else {
                        Origin::Discovered
                    };
                    self.stage(state, &module, None, origin)?;
                }
            }
            Err(e) => {
                tracing::warn!("Skipping package {}: {}", package, e);
                state.report.registered.insert(package);
                state.report.failures.push(ModuleFailure {
                    module: package.to_string(),
                    error: e,
                });
            }
        }
        Ok(())
    }

    /// Materialize one module, routing its failure by severity and origin.
    fn stage(
        &self,
        state: &mut RunState<'_>,
        name: &str,
        source: Option<&Path>,
        origin: Origin,
    ) -> Result<()> {
        let report = &mut state.report;

        let outcome = if self.config.dry_run {
            match state
                .materializer
                .plan(name, source, &mut report.registered, &state.manifest)
            {
                Ok(true) => {
                    report.planned.push(name.to_string());
                    Ok(())
                }
                Ok(false) => Ok(()),
                Err(e) => Err(e),
            }
        } else {
            match state
                .materializer
                .materialize(name, source, &mut report.registered, &state.manifest)
            {
                Ok(Some(artifact)) => {
                    state.manifest.append(artifact.registration());
                    report.staged.push(artifact);
                    Ok(())
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            }
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(Error::Unresolvable(missing)) if origin == Origin::Discovered => {
                tracing::debug!("Skipping unresolvable dependency {}", missing);
                report.skipped.push(missing);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{}", e);
                report.failures.push(ModuleFailure {
                    module: name.to_string(),
                    error: e,
                });
                Ok(())
            }
        }
    }
}
