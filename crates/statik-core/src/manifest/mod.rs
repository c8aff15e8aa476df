//! Build manifest (`Modules/Setup`) handling.
//!
//! This module provides:
//! - Typed manifest lines that keep their original text
//! - The registry ledger: registered names, activation of disabled entries
//! - The manifest writer

mod line;
mod registered;
mod writer;

pub use line::{ManifestLine, Registration};
pub use registered::{HOST_MODULE, RegisteredSet};
pub use writer::write_manifest;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::locate::ModuleLocator;

/// In-memory build manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    lines: Vec<ManifestLine>,
    line_ending: &'static str,
    trailing_newline: bool,
    appended: usize,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] if the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(path, &text))
    }

    /// Parse manifest text that belongs to `path`.
    ///
    /// The line terminator of the first line (`\n` or `\r\n`) is kept and
    /// used for every line on render.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Self {
        let line_ending = match text.find('\n') {
            Some(end) if text[..end].ends_with('\r') => "\r\n",
            _ => "\n",
        };
        Self {
            path: path.into(),
            lines: text.lines().map(ManifestLine::parse).collect(),
            line_ending,
            trailing_newline: text.ends_with('\n'),
            appended: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[ManifestLine] {
        &self.lines
    }

    /// Number of lines generated during this run.
    pub fn appended(&self) -> usize {
        self.appended
    }

    /// All registrations with their active flag, in file order.
    pub fn registrations(&self) -> impl Iterator<Item = (&Registration, bool)> {
        self.lines
            .iter()
            .filter_map(|line| line.registration().map(|entry| (entry, line.is_active())))
    }

    /// The active registration of `name`, if any.
    pub fn active_entry(&self, name: &str) -> Option<&Registration> {
        self.registrations()
            .find_map(|(entry, active)| (active && entry.name == name).then_some(entry))
    }

    /// Whether an active line registers `name`.
    pub fn has_active(&self, name: &str) -> bool {
        self.active_entry(name).is_some()
    }

    /// Whether any line, active or disabled, registers `name`.
    pub fn has_registration(&self, name: &str) -> bool {
        self.registrations().any(|(entry, _)| entry.name == name)
    }

    /// Uncomment the disabled registration of `name`, in place.
    ///
    /// Returns `true` and marks the name registered if a `#<name> ...` line
    /// was found. No other line is touched.
    pub fn activate(&mut self, name: &str, registered: &mut RegisteredSet) -> bool {
        let position = self.lines.iter().position(|line| {
            matches!(line, ManifestLine::Disabled { entry, .. } if entry.name == name)
        });

        let Some(index) = position else {
            return false;
        };
        self.lines[index].enable();
        registered.insert(name);
        tracing::info!("Activated {} in {}", name, self.path.display());
        true
    }

    /// Record the names of active registrations in `registered`.
    ///
    /// Registrations backed by a package are left out, since a package line
    /// doesn't mean all of its submodules are present. Returns the names that
    /// were added.
    pub fn scan_active_names(
        &self,
        locator: &ModuleLocator,
        registered: &mut RegisteredSet,
    ) -> Vec<String> {
        let mut found = Vec::new();
        for (entry, active) in self.registrations() {
            if !active {
                continue;
            }
            let is_package = locator
                .locate(&entry.name)
                .is_some_and(|location| location.is_package());
            if is_package {
                tracing::debug!("{} is a package, its submodules still need resolving", entry.name);
                continue;
            }
            if registered.insert(&entry.name) {
                found.push(entry.name.clone());
            }
        }
        found
    }

    /// Append a generated registration at the end of the manifest.
    pub fn append(&mut self, entry: Registration) {
        self.lines.push(ManifestLine::active(entry));
        self.appended += 1;
    }

    /// Serialize the manifest, keeping untouched lines verbatim.
    pub fn render(&self) -> String {
        let mut text = self
            .lines
            .iter()
            .map(ManifestLine::text)
            .collect::<Vec<_>>()
            .join(self.line_ending);
        if self.trailing_newline && !text.is_empty() {
            text.push_str(self.line_ending);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::SearchContext;
    use tempfile::TempDir;

    const SETUP: &str = "\
# Edit this file for local setup changes
*static*

posix posixmodule.c
#json jsonmodule.c
#_md5 md5module.c
mypkg extras/mypkg/mypkg.c
";

    #[test]
    fn test_load_missing() {
        let temp = TempDir::new().unwrap();
        let err = Manifest::load(temp.path().join("Setup")).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound(_)));
    }

    #[test]
    fn test_render_roundtrip() {
        let manifest = Manifest::parse("Setup", SETUP);
        assert_eq!(manifest.render(), SETUP);

        let no_newline = "posix posixmodule.c\n#json jsonmodule.c";
        assert_eq!(Manifest::parse("Setup", no_newline).render(), no_newline);
    }

    #[test]
    fn test_activate_only_touches_target() {
        let mut manifest = Manifest::parse("Setup", SETUP);
        let before: Vec<String> = manifest.lines().iter().map(|l| l.text().to_string()).collect();
        let mut registered = RegisteredSet::default();

        assert!(manifest.activate("json", &mut registered));
        assert!(registered.contains("json"));
        assert!(manifest.has_active("json"));

        let after: Vec<String> = manifest.lines().iter().map(|l| l.text().to_string()).collect();
        assert_eq!(before.len(), after.len());
        for (index, (old, new)) in before.iter().zip(&after).enumerate() {
            if old == "#json jsonmodule.c" {
                assert_eq!(new, "json jsonmodule.c");
            } else {
                assert_eq!(old, new, "line {index} changed");
            }
        }
    }

    #[test]
    fn test_activate_missing() {
        let mut manifest = Manifest::parse("Setup", SETUP);
        let mut registered = RegisteredSet::default();

        assert!(!manifest.activate("js", &mut registered));
        assert!(!manifest.activate("posix", &mut registered));
        assert!(!registered.contains("js"));
        assert_eq!(manifest.render(), SETUP);
    }

    #[test]
    fn test_scan_skips_packages() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("mypkg")).unwrap();
        fs::write(temp.path().join("mypkg/__init__.py"), "").unwrap();

        let manifest = Manifest::parse("Setup", SETUP);
        let locator = ModuleLocator::new(SearchContext::new([temp.path()]));
        let mut registered = RegisteredSet::default();

        let found = manifest.scan_active_names(&locator, &mut registered);
        assert_eq!(found, vec!["posix".to_string()]);
        assert!(!registered.contains("mypkg"));
        assert!(!registered.contains("json"));
        assert!(manifest.has_active("mypkg"));
    }

    #[test]
    fn test_flags_before_source() {
        let text = "\
#_struct -DPy_BUILD_CORE_MODULE _struct.c
_json -I$(srcdir)/Include/internal -DPy_BUILD_CORE_BUILTIN _json.c
";
        let mut manifest = Manifest::parse("Setup", text);
        let mut registered = RegisteredSet::default();

        assert!(manifest.activate("_struct", &mut registered));
        assert!(manifest.has_active("_struct"));
        assert_eq!(
            manifest.lines()[0].text(),
            "_struct -DPy_BUILD_CORE_MODULE _struct.c"
        );

        let locator = ModuleLocator::new(SearchContext::default());
        let found = manifest.scan_active_names(&locator, &mut registered);
        assert_eq!(found, vec!["_json".to_string()]);
        assert!(registered.contains("_json"));
        assert_eq!(
            manifest.active_entry("_json").map(|entry| entry.target.as_str()),
            Some("_json.c")
        );
    }

    #[test]
    fn test_crlf_is_kept() {
        let text = "*static*\r\n#json jsonmodule.c\r\nposix posixmodule.c\r\n";
        let mut manifest = Manifest::parse("Setup", text);
        assert_eq!(manifest.render(), text);

        manifest.activate("json", &mut RegisteredSet::default());
        manifest.append(Registration::new("foo", "extras/foo.c", &[]));
        assert_eq!(
            manifest.render(),
            "*static*\r\njson jsonmodule.c\r\nposix posixmodule.c\r\nfoo extras/foo.c\r\n"
        );
    }

    #[test]
    fn test_append() {
        let mut manifest = Manifest::parse("Setup", SETUP);
        manifest.append(Registration::new("mypkg__a", "extras/mypkg/mypkg__a.c", &[]));

        assert_eq!(manifest.appended(), 1);
        assert!(manifest.render().ends_with("mypkg extras/mypkg/mypkg.c\nmypkg__a extras/mypkg/mypkg__a.c\n"));
        assert_eq!(
            manifest.registrations().filter(|(_, active)| *active).count(),
            3
        );
    }
}
