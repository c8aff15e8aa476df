//! Package enumeration from the filesystem.

use std::collections::BTreeSet;
use std::fs;

use crate::error::{Error, Result};
use crate::locate::{ModuleKind, ModuleLocator, SearchContext, package_init};
use crate::stage::naming::{bare_stem, is_module_name};

use super::PackageImporter;

/// Enumerates package members by listing the package directory.
///
/// Needs no interpreter. Every module file and sub-package on disk counts as
/// a member, whether or not the package imports it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemImporter;

impl PackageImporter for FilesystemImporter {
    fn members(&self, module: &str, search: &SearchContext) -> Result<Vec<String>> {
        let locator = ModuleLocator::new(search.clone());
        let location = locator.locate(module).ok_or_else(|| Error::PackageImport {
            package: module.to_string(),
            message: format!("no module named {module}"),
        })?;

        if !location.is_package() {
            return Ok(Vec::new());
        }
        let Some(package_dir) = location.path.parent() else {
            return Ok(Vec::new());
        };

        let mut members = BTreeSet::new();
        for entry in fs::read_dir(package_dir)? {
            let path = entry?.path();

            let child = if path.is_dir() {
                if package_init(&path).is_none() {
                    continue;
                }
                path.file_name().and_then(|n| n.to_str())
            } else {
                match ModuleKind::of_path(&path) {
                    Some(ModuleKind::Package | ModuleKind::NativeSource) | None => continue,
                    Some(_) => bare_stem(&path),
                }
            };

            if let Some(child) = child.filter(|c| is_module_name(c)) {
                members.insert(format!("{module}.{child}"));
            }
        }

        Ok(members.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_members() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path();
        touch(&lib.join("mypkg/__init__.py"));
        touch(&lib.join("mypkg/a.py"));
        touch(&lib.join("mypkg/a.pyc"));
        touch(&lib.join("mypkg/b.pyx"));
        touch(&lib.join("mypkg/_c.cpython-311-x86_64-linux-gnu.so"));
        touch(&lib.join("mypkg/helper.c"));
        touch(&lib.join("mypkg/sub/__init__.py"));
        touch(&lib.join("mypkg/data/blob.txt"));
        touch(&lib.join("mypkg/not-a-module.py"));

        let search = SearchContext::new([lib]);

        assert_eq!(
            FilesystemImporter.members("mypkg", &search).unwrap(),
            vec!["mypkg._c", "mypkg.a", "mypkg.b", "mypkg.sub"]
        );
        assert!(FilesystemImporter.members("mypkg.a", &search).unwrap().is_empty());
        assert!(FilesystemImporter.members("missing", &search).is_err());
    }
}
