//! Module materialization.
//!
//! Turns one module name into a compilable translation unit under
//! `Modules/extras/` and the registration that points the build at it.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::locate::{
    BYTECODE_EXT, HIGH_LEVEL_EXTS, ModuleKind, ModuleLocation, ModuleLocator, NATIVE_SOURCE_EXTS,
    NATIVE_SOURCE_SUFFIXES, NativeSourceFinder, SourceOverrideMap,
};
use crate::manifest::{Manifest, RegisteredSet};
use crate::paths::{EXTRAS_DIR_NAME, RuntimeDirs};
use crate::tools::Transpiler;

use super::naming::{self, flatten, is_dotted, package_root};
use super::types::{ArtifactKind, StagedArtifact};

/// The file a module will be staged from, after classification.
struct StageSource {
    path: PathBuf,
    kind: ArtifactKind,
    /// Directory the native source was found in, for prebuilt modules.
    source_dir: Option<PathBuf>,
}

/// Stages modules into the runtime tree.
///
/// Holds the destinations claimed during the run, so two distinct modules
/// can never be staged to the same file.
pub struct Materializer<'a> {
    dirs: &'a RuntimeDirs,
    locator: &'a ModuleLocator,
    finder: NativeSourceFinder<'a>,
    transpiler: &'a dyn Transpiler,
    claimed: FxHashMap<String, String>,
}

impl<'a> Materializer<'a> {
    pub fn new(
        dirs: &'a RuntimeDirs,
        locator: &'a ModuleLocator,
        overrides: &'a SourceOverrideMap,
        transpiler: &'a dyn Transpiler,
    ) -> Self {
        Self {
            dirs,
            locator,
            finder: NativeSourceFinder::new(overrides, locator.search()),
            transpiler,
            claimed: FxHashMap::default(),
        }
    }

    /// Stage `name` and return the artifact to register.
    ///
    /// Returns `Ok(None)` when the name is already registered, either in
    /// `registered` or by its own active manifest line. The name is marked
    /// registered before any work is done, so a module that fails is not
    /// attempted twice.
    ///
    /// # Errors
    ///
    /// All errors are scoped to this module: unresolvable names, lone
    /// byte-compiled files, missing native sources, transpiler failures,
    /// unknown artifacts and flatten collisions.
    pub fn materialize(
        &mut self,
        name: &str,
        hint: Option<&Path>,
        registered: &mut RegisteredSet,
        manifest: &Manifest,
    ) -> Result<Option<StagedArtifact>> {
        let Some(location) = self.prepare(name, hint, registered, manifest)? else {
            return Ok(None);
        };

        let in_package =
            is_dotted(name) || location.as_ref().is_some_and(ModuleLocation::is_package);
        if !in_package {
            if let Some(artifact) = self.find_in_tree(name)? {
                return Ok(Some(artifact));
            }
        }
        let location = location.ok_or_else(|| Error::Unresolvable(name.to_string()))?;
        let target_name = flatten(name);

        let origin = self.classify(name, &location)?;
        let staged_name = naming::staged_file_name(name, in_package, &origin.path)
            .ok_or_else(|| Error::UnknownArtifact(origin.path.clone()))?;
        let final_name = match origin.kind {
            ArtifactKind::Translated => naming::with_extension(&staged_name, "c"),
            _ => staged_name.clone(),
        };
        let root = in_package.then(|| package_root(name));
        let relative_path = naming::manifest_path(root, &final_name);
        self.claim(name, &relative_path)?;

        let dest_dir = self.dirs.ensure_staging_dir(root)?;
        let staged = dest_dir.join(&staged_name);
        if staged.exists() {
            tracing::debug!("{} already staged at {}", name, staged.display());
        } else {
            fs::copy(&origin.path, &staged)?;
            tracing::debug!("Copied {} to {}", origin.path.display(), staged.display());
        }

        if origin.kind == ArtifactKind::Translated {
            let translated = dest_dir.join(&final_name);
            self.translate(name, &target_name, in_package, &staged, &translated)?;
        }

        let mut include_flags = Vec::new();
        if let Some(dir) = &origin.source_dir {
            push_include(&mut include_flags, dir)?;
        }
        for dir in [self.dirs.modules_dir.join(name), dest_dir.join(name)] {
            if dir.is_dir() {
                push_include(&mut include_flags, &dir)?;
            }
        }

        tracing::info!("Staged {} as {}", name, relative_path);
        Ok(Some(StagedArtifact {
            module: name.to_string(),
            target_name,
            relative_path,
            kind: origin.kind,
            include_flags,
        }))
    }

    /// Check that `name` could be staged, without touching the file system.
    ///
    /// Returns `Ok(false)` when the name is already registered. Errors are the
    /// ones [`Materializer::materialize`] would report, except transpiler
    /// failures.
    pub fn plan(
        &self,
        name: &str,
        hint: Option<&Path>,
        registered: &mut RegisteredSet,
        manifest: &Manifest,
    ) -> Result<bool> {
        let Some(location) = self.prepare(name, hint, registered, manifest)? else {
            return Ok(false);
        };

        let in_package =
            is_dotted(name) || location.as_ref().is_some_and(ModuleLocation::is_package);
        if !in_package && in_tree_source(&self.dirs.modules_dir, name).is_some() {
            return Ok(true);
        }
        let location = location.ok_or_else(|| Error::Unresolvable(name.to_string()))?;
        self.classify(name, &location)?;
        Ok(true)
    }

    /// Mark `name` registered and locate it.
    ///
    /// `None` means there is nothing to do. The inner location is `None` when
    /// the name can't be found in the search context.
    fn prepare(
        &self,
        name: &str,
        hint: Option<&Path>,
        registered: &mut RegisteredSet,
        manifest: &Manifest,
    ) -> Result<Option<Option<ModuleLocation>>> {
        if !registered.insert(name) {
            return Ok(None);
        }
        if has_own_registration(manifest, name)? {
            tracing::debug!("{} already has an active registration", name);
            return Ok(None);
        }

        let location = match hint {
            Some(path) => Some(
                ModuleLocation::from_path(name, path)
                    .ok_or_else(|| Error::UnknownArtifact(path.to_path_buf()))?,
            ),
            None => self.locator.locate(name),
        };
        Ok(Some(location))
    }

    /// Pick the file to stage and how it becomes a translation unit.
    fn classify(&self, name: &str, location: &ModuleLocation) -> Result<StageSource> {
        let path = match location.kind {
            ModuleKind::Extension => {
                let source = self.finder.find(name, &location.path)?;
                return Ok(StageSource {
                    path: source.path,
                    kind: ArtifactKind::LocatedNativeSource,
                    source_dir: Some(source.dir),
                });
            }
            // Byte-compiled modules and package initializers stage their source.
            ModuleKind::ByteCompiled | ModuleKind::Package
                if naming::extension(&location.path) == Some(BYTECODE_EXT) =>
            {
                let source = location.path.with_extension("py");
                if !source.is_file() {
                    return Err(Error::LoneBytecode(location.path.clone()));
                }
                source
            }
            _ => location.path.clone(),
        };

        match naming::extension(&path) {
            Some(ext) if HIGH_LEVEL_EXTS.contains(&ext) => Ok(StageSource {
                path,
                kind: ArtifactKind::Translated,
                source_dir: None,
            }),
            Some(ext) if NATIVE_SOURCE_EXTS.contains(&ext) => {
                let source_dir = path.parent().map(Path::to_path_buf);
                Ok(StageSource {
                    path,
                    kind: ArtifactKind::NativeSource,
                    source_dir,
                })
            }
            _ => Err(Error::UnknownArtifact(path)),
        }
    }

    /// Register a native source already present under `Modules/`.
    fn find_in_tree(&mut self, name: &str) -> Result<Option<StagedArtifact>> {
        let Some(relative_path) = in_tree_source(&self.dirs.modules_dir, name) else {
            return Ok(None);
        };

        self.claim(name, &relative_path)?;
        let mut include_flags = Vec::new();
        for dir in [
            self.dirs.modules_dir.join(name),
            self.dirs.extras_dir.join(name),
        ] {
            if dir.is_dir() {
                push_include(&mut include_flags, &dir)?;
            }
        }

        tracing::info!("Using in-tree source {} for {}", relative_path, name);
        Ok(Some(StagedArtifact {
            module: name.to_string(),
            target_name: name.to_string(),
            relative_path,
            kind: ArtifactKind::InTree,
            include_flags,
        }))
    }

    fn claim(&mut self, name: &str, relative_path: &str) -> Result<()> {
        match self.claimed.get(relative_path) {
            Some(existing) if existing != name => Err(Error::FlattenCollision {
                name: name.to_string(),
                flattened: relative_path.to_string(),
                existing: existing.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.claimed
                    .insert(relative_path.to_string(), name.to_string());
                Ok(())
            }
        }
    }

    /// Translate `staged` into `translated` unless that already exists.
    ///
    /// A partial output is removed when translation fails.
    fn translate(
        &self,
        name: &str,
        target_name: &str,
        in_package: bool,
        staged: &Path,
        translated: &Path,
    ) -> Result<()> {
        if translated.exists() {
            tracing::debug!("{} already translated", name);
            return Ok(());
        }

        let result = self
            .transpiler
            .translate(staged)
            .and_then(|output| {
                if output != translated {
                    fs::rename(&output, translated)?;
                }
                if in_package && target_name != name {
                    fix_identity(translated, target_name, name)?;
                }
                Ok(())
            });

        result.map_err(|e| {
            if translated.exists() {
                if let Err(remove_err) = fs::remove_file(translated) {
                    tracing::warn!(
                        "Failed to remove partial output {}: {}",
                        translated.display(),
                        remove_err
                    );
                }
            }
            match e {
                Error::Toolchain(_) | Error::Transpile { .. } => e,
                other => Error::Transpile {
                    module: name.to_string(),
                    message: other.to_string(),
                },
            }
        })
    }
}

/// Whether `name` already has its own active registration.
///
/// # Errors
///
/// Returns [`Error::FlattenCollision`] when the flattened name is registered
/// for a different module, such as `a.b` against a top-level `a__b`.
pub fn has_own_registration(manifest: &Manifest, name: &str) -> Result<bool> {
    let target_name = flatten(name);
    match manifest.active_entry(&target_name) {
        Some(entry) if naming::owns_registration(name, &entry.target) => Ok(true),
        Some(entry) => Err(Error::FlattenCollision {
            name: name.to_string(),
            flattened: target_name,
            existing: entry.target.clone(),
        }),
        None => Ok(false),
    }
}

/// Native source of a top-level module already in the runtime tree.
///
/// Probes `<name><suffix>`, `<name>/<name><suffix>` and
/// `extras/<name>/<name><suffix>` under `modules_dir`, returning the
/// `/`-separated path relative to it.
pub fn in_tree_source(modules_dir: &Path, name: &str) -> Option<String> {
    let subdirs = [
        String::new(),
        format!("{name}/"),
        format!("{EXTRAS_DIR_NAME}/{name}/"),
    ];

    NATIVE_SOURCE_SUFFIXES.iter().find_map(|suffix| {
        subdirs.iter().find_map(|subdir| {
            let relative_path = format!("{subdir}{name}{suffix}");
            modules_dir
                .join(&relative_path)
                .is_file()
                .then_some(relative_path)
        })
    })
}

/// Replace the quoted flattened identity string with the dotted name.
fn fix_identity(path: &Path, flattened: &str, dotted: &str) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let fixed = text.replace(&format!("\"{flattened}\""), &format!("\"{dotted}\""));
    if fixed == text {
        return Ok(());
    }

    let tmp = path.with_extension("c.tmp");
    fs::write(&tmp, fixed)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn push_include(flags: &mut Vec<String>, dir: &Path) -> Result<()> {
    let flag = format!("-I{}", std::path::absolute(dir)?.display());
    if !flags.contains(&flag) {
        flags.push(flag);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::SearchContext;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Writes `<stem>.c` holding the staged file name in quotes.
    #[derive(Default)]
    struct EchoTranspiler {
        calls: Cell<usize>,
    }

    impl Transpiler for EchoTranspiler {
        fn translate(&self, source: &Path) -> Result<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            let stem = source.file_stem().unwrap().to_str().unwrap();
            let output = source.with_extension("c");
            fs::write(&output, format!("PyInit(\"{stem}\");\n"))?;
            Ok(output)
        }
    }

    struct FailingTranspiler;

    impl Transpiler for FailingTranspiler {
        fn translate(&self, source: &Path) -> Result<PathBuf> {
            fs::write(source.with_extension("c"), "/* partial */")?;
            Err(Error::Transpile {
                module: source.display().to_string(),
                message: "syntax error".into(),
            })
        }
    }

    struct Fixture {
        _temp: TempDir,
        dirs: RuntimeDirs,
        lib: PathBuf,
        manifest: Manifest,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let dirs = RuntimeDirs::new(temp.path().join("python"));
        fs::create_dir_all(&dirs.modules_dir).unwrap();
        let lib = temp.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        let manifest = Manifest::parse(&dirs.manifest_path, "");
        Fixture {
            _temp: temp,
            dirs,
            lib,
            manifest,
        }
    }

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_package_member_is_flattened() {
        let fx = fixture();
        write(&fx.lib.join("mypkg/__init__.py"), "");
        write(&fx.lib.join("mypkg/a.py"), "x = 1\n");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);
        let mut registered = RegisteredSet::default();

        let artifact = materializer
            .materialize("mypkg.a", None, &mut registered, &fx.manifest)
            .unwrap()
            .unwrap();

        assert_eq!(artifact.target_name, "mypkg__a");
        assert_eq!(artifact.relative_path, "extras/mypkg/mypkg__a.c");
        assert_eq!(artifact.kind, ArtifactKind::Translated);

        let generated = fs::read_to_string(fx.dirs.extras_dir.join("mypkg/mypkg__a.c")).unwrap();
        assert!(generated.contains("\"mypkg.a\""));
        assert!(!generated.contains("\"mypkg__a\""));

        // Second attempt is a no-op.
        assert!(
            materializer
                .materialize("mypkg.a", None, &mut registered, &fx.manifest)
                .unwrap()
                .is_none()
        );
        assert_eq!(transpiler.calls.get(), 1);
    }

    #[test]
    fn test_top_level_keeps_file_name() {
        let fx = fixture();
        write(&fx.lib.join("helpers.py"), "");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        let artifact = materializer
            .materialize("helpers", None, &mut RegisteredSet::default(), &fx.manifest)
            .unwrap()
            .unwrap();
        assert_eq!(artifact.relative_path, "extras/helpers.c");
        assert!(fx.dirs.extras_dir.join("helpers.py").is_file());
        assert!(artifact.include_flags.is_empty());
    }

    #[test]
    fn test_existing_translation_is_reused() {
        let fx = fixture();
        write(&fx.lib.join("helpers.py"), "");
        write(&fx.dirs.extras_dir.join("helpers.c"), "/* kept */");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        materializer
            .materialize("helpers", None, &mut RegisteredSet::default(), &fx.manifest)
            .unwrap();
        assert_eq!(transpiler.calls.get(), 0);
        assert_eq!(
            fs::read_to_string(fx.dirs.extras_dir.join("helpers.c")).unwrap(),
            "/* kept */"
        );
    }

    #[test]
    fn test_failed_translation_is_removed() {
        let fx = fixture();
        write(&fx.lib.join("broken.py"), "def (:\n");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let mut materializer =
            Materializer::new(&fx.dirs, &locator, &overrides, &FailingTranspiler);

        let err = materializer
            .materialize("broken", None, &mut RegisteredSet::default(), &fx.manifest)
            .unwrap_err();
        assert!(matches!(err, Error::Transpile { .. }));
        assert!(!fx.dirs.extras_dir.join("broken.c").exists());
    }

    #[test]
    fn test_prebuilt_with_source() {
        let fx = fixture();
        write(&fx.lib.join("_speedups.cpython-311-x86_64-linux-gnu.so"), "");
        write(&fx.lib.join("_speedups.c"), "/* native */");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        let artifact = materializer
            .materialize("_speedups", None, &mut RegisteredSet::default(), &fx.manifest)
            .unwrap()
            .unwrap();
        assert_eq!(artifact.kind, ArtifactKind::LocatedNativeSource);
        assert_eq!(artifact.relative_path, "extras/_speedups.c");
        let lib = std::path::absolute(&fx.lib).unwrap();
        assert_eq!(artifact.include_flags, vec![format!("-I{}", lib.display())]);
        assert_eq!(transpiler.calls.get(), 0);
    }

    #[test]
    fn test_prebuilt_without_source() {
        let fx = fixture();
        write(&fx.lib.join("_blob.so"), "");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);
        let mut registered = RegisteredSet::default();

        let err = materializer
            .materialize("_blob", None, &mut registered, &fx.manifest)
            .unwrap_err();
        assert!(matches!(err, Error::MissingNativeSource { .. }));
        assert!(registered.contains("_blob"));
    }

    #[test]
    fn test_lone_bytecode() {
        let fx = fixture();
        write(&fx.lib.join("cached.pyc"), "");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        let err = materializer
            .materialize("cached", None, &mut RegisteredSet::default(), &fx.manifest)
            .unwrap_err();
        assert!(matches!(err, Error::LoneBytecode(_)));
    }

    #[test]
    fn test_in_tree_source() {
        let fx = fixture();
        write(&fx.dirs.modules_dir.join("_fast/_fastmodule.c"), "");
        write(&fx.lib.join("_fast.py"), "");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        let artifact = materializer
            .materialize("_fast", None, &mut RegisteredSet::default(), &fx.manifest)
            .unwrap()
            .unwrap();
        assert_eq!(artifact.kind, ArtifactKind::InTree);
        assert_eq!(artifact.relative_path, "_fast/_fastmodule.c");
        assert_eq!(artifact.include_flags.len(), 1);
        assert!(!fx.dirs.extras_dir.exists());
        assert_eq!(transpiler.calls.get(), 0);
    }

    #[test]
    fn test_hint_overrides_lookup() {
        let fx = fixture();
        let pinned = fx.lib.join("elsewhere/fast.pyx");
        write(&pinned, "");

        let locator = ModuleLocator::new(SearchContext::default());
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        let artifact = materializer
            .materialize("fast", Some(&pinned), &mut RegisteredSet::default(), &fx.manifest)
            .unwrap()
            .unwrap();
        assert_eq!(artifact.relative_path, "extras/fast.c");

        let readme = fx.lib.join("README.txt");
        write(&readme, "");
        let err = materializer
            .materialize("readme", Some(&readme), &mut RegisteredSet::default(), &fx.manifest)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownArtifact(_)));
    }

    #[test]
    fn test_active_flattened_line_skips() {
        let mut fx = fixture();
        fx.manifest = Manifest::parse(&fx.dirs.manifest_path, "mypkg extras/mypkg/mypkg.c\n");
        write(&fx.lib.join("mypkg/__init__.py"), "");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        assert!(
            materializer
                .materialize("mypkg", None, &mut RegisteredSet::default(), &fx.manifest)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_flattened_line_of_other_module_collides() {
        let mut fx = fixture();
        fx.manifest = Manifest::parse(&fx.dirs.manifest_path, "a__b extras/a/a__b.c
");
        write(&fx.lib.join("a__b.py"), "");
        write(&fx.lib.join("a/b.py"), "");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        let err = materializer
            .materialize("a__b", None, &mut RegisteredSet::default(), &fx.manifest)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FlattenCollision { ref name, ref existing, .. }
                if name == "a__b" && existing == "extras/a/a__b.c"
        ));
        assert!(!fx.dirs.extras_dir.join("a__b.c").exists());

        // The member that owns the line is simply already registered.
        assert!(
            materializer
                .materialize("a.b", None, &mut RegisteredSet::default(), &fx.manifest)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_plan_touches_nothing() {
        let fx = fixture();
        write(&fx.lib.join("helpers.py"), "");
        write(&fx.lib.join("_blob.so"), "");

        let locator = ModuleLocator::new(SearchContext::new([&fx.lib]));
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);
        let mut registered = RegisteredSet::default();

        assert!(materializer.plan("helpers", None, &mut registered, &fx.manifest).unwrap());
        assert!(!materializer.plan("helpers", None, &mut registered, &fx.manifest).unwrap());
        let err = materializer
            .plan("_blob", None, &mut registered, &fx.manifest)
            .unwrap_err();
        assert!(matches!(err, Error::MissingNativeSource { .. }));
        let err = materializer
            .plan("ghost", None, &mut registered, &fx.manifest)
            .unwrap_err();
        assert!(matches!(err, Error::Unresolvable(_)));

        assert!(!fx.dirs.extras_dir.exists());
        assert_eq!(transpiler.calls.get(), 0);
    }

    #[test]
    fn test_claim_collision() {
        let fx = fixture();
        let locator = ModuleLocator::new(SearchContext::default());
        let overrides = SourceOverrideMap::new();
        let transpiler = EchoTranspiler::default();
        let mut materializer = Materializer::new(&fx.dirs, &locator, &overrides, &transpiler);

        materializer.claim("one", "extras/x.c").unwrap();
        materializer.claim("one", "extras/x.c").unwrap();
        let err = materializer.claim("two", "extras/x.c").unwrap_err();
        assert!(matches!(err, Error::FlattenCollision { existing, .. } if existing == "one"));
    }
}
