//! Naming rules for staged module artifacts.
//!
//! Package members are staged under `extras/<package-root>/` with their dotted
//! name flattened by `__` joins, top-level modules keep their file name under
//! `extras/`. The directory split keeps `pkg.sub.mod` (staged at
//! `extras/pkg/pkg__sub__mod.c`) apart from a top-level module literally
//! named `pkg__sub__mod` (staged at `extras/pkg__sub__mod.c`).

use std::path::Path;

use crate::paths::EXTRAS_DIR_NAME;

/// Separator replacing `.` in flattened names.
pub const FLATTEN_SEPARATOR: &str = "__";

/// Flatten a dotted module name into a single identifier.
///
/// `pkg.sub.mod` becomes `pkg__sub__mod`. Top-level names are unchanged.
pub fn flatten(name: &str) -> String {
    name.replace('.', FLATTEN_SEPARATOR)
}

/// First segment of a dotted module name.
pub fn package_root(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Whether a name refers to a module nested inside a package.
pub fn is_dotted(name: &str) -> bool {
    name.contains('.')
}

/// Whether every dotted segment is a valid identifier.
pub fn is_module_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// File extension of a path, without the dot.
pub fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Bare stem of a module file: everything before the first dot.
///
/// Strips ABI tags from extension modules, so
/// `_json.cpython-311-x86_64-linux-gnu.so` yields `_json`.
pub fn bare_stem(path: &Path) -> Option<&str> {
    let file_name = path.file_name()?.to_str()?;
    file_name.split('.').next().filter(|stem| !stem.is_empty())
}

/// File name a module is staged under.
///
/// Package members take their flattened name plus the origin's extension;
/// top-level modules keep the origin's file name.
pub fn staged_file_name(name: &str, in_package: bool, origin: &Path) -> Option<String> {
    if in_package {
        let ext = extension(origin)?;
        Some(format!("{}.{}", flatten(name), ext))
    } else {
        origin.file_name()?.to_str().map(str::to_string)
    }
}

/// Replace the extension of a staged file name.
pub fn with_extension(file_name: &str, ext: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.{ext}"),
        None => format!("{file_name}.{ext}"),
    }
}

/// Manifest-relative path of a staged file, always `/`-separated.
pub fn manifest_path(package_root: Option<&str>, file_name: &str) -> String {
    match package_root {
        Some(root) => format!("{EXTRAS_DIR_NAME}/{root}/{file_name}"),
        None => format!("{EXTRAS_DIR_NAME}/{file_name}"),
    }
}

/// Whether an active line registering `flatten(name)` with source `target`
/// was written for `name` itself.
///
/// Package members are staged under `extras/<root>/`, so a line pointing
/// there belongs to a dotted name. A top-level name owns every other line.
pub fn owns_registration(name: &str, target: &str) -> bool {
    if is_dotted(name) {
        let member_dir = format!("{EXTRAS_DIR_NAME}/{}/", package_root(name));
        return target.starts_with(&member_dir);
    }
    match target
        .strip_prefix(EXTRAS_DIR_NAME)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|rest| rest.split_once('/'))
    {
        Some((dir, _)) => dir == name,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn staged_destination(name: &str) -> String {
        let origin = PathBuf::from(format!("/lib/{}.py", name.rsplit('.').next().unwrap()));
        let in_package = is_dotted(name);
        let file = staged_file_name(name, in_package, &origin).unwrap();
        let file = with_extension(&file, "c");
        manifest_path(in_package.then(|| package_root(name)), &file)
    }

    #[test]
    fn test_flatten() {
        assert_eq!(flatten("json"), "json");
        assert_eq!(flatten("pkg.sub.mod"), "pkg__sub__mod");
        assert_eq!(package_root("pkg.sub.mod"), "pkg");
        assert_eq!(package_root("json"), "json");
    }

    #[test]
    fn test_module_names() {
        assert!(is_module_name("os"));
        assert!(is_module_name("_sha256"));
        assert!(is_module_name("xml.dom.minidom"));
        assert!(!is_module_name(""));
        assert!(!is_module_name("a..b"));
        assert!(!is_module_name("1abc"));
        assert!(!is_module_name("foo-bar"));
    }

    #[test]
    fn test_bare_stem() {
        assert_eq!(
            bare_stem(Path::new("/usr/lib/_json.cpython-311-x86_64-linux-gnu.so")),
            Some("_json")
        );
        assert_eq!(bare_stem(Path::new("speedups.so")), Some("speedups"));
        assert_eq!(bare_stem(Path::new(".hidden")), None);
    }

    #[test]
    fn test_owns_registration() {
        assert!(owns_registration("a.b", "extras/a/a__b.c"));
        assert!(!owns_registration("a.b", "extras/a__b.c"));
        assert!(!owns_registration("a.b", "a__bmodule.c"));
        assert!(owns_registration("a__b", "extras/a__b.c"));
        assert!(!owns_registration("a__b", "extras/a/a__b.c"));
        assert!(owns_registration("mypkg", "extras/mypkg/mypkg.c"));
        assert!(owns_registration("posix", "posixmodule.c"));
        assert!(owns_registration("_fast", "extras/_fast/_fastmodule.c"));
    }

    #[test]
    fn test_staged_paths() {
        assert_eq!(staged_destination("mypkg.a"), "extras/mypkg/mypkg__a.c");
        assert_eq!(staged_destination("json"), "extras/json.c");
        assert_eq!(
            staged_file_name("mypkg", true, Path::new("/lib/mypkg/__init__.py")),
            Some("mypkg.py".to_string())
        );
    }

    #[test]
    fn test_dotted_never_collides_with_literal_flattened_name() {
        assert_ne!(staged_destination("a.b"), staged_destination("a__b"));
        assert_ne!(
            staged_destination("pkg.sub.mod"),
            staged_destination("pkg__sub__mod")
        );
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,3}(_[a-z0-9]{1,3})?"
    }

    fn module_name() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..4).prop_map(|segments| segments.join("."))
    }

    proptest! {
        #[test]
        fn flattening_is_injective_on_destinations(
            names in prop::collection::hash_set(module_name(), 1..24)
        ) {
            let mut seen: HashMap<String, String> = HashMap::new();
            for name in &names {
                let dest = staged_destination(name);
                if let Some(previous) = seen.insert(dest.clone(), name.clone()) {
                    prop_assert!(false, "{} and {} both stage to {}", previous, name, dest);
                }
            }
        }

        #[test]
        fn adversarial_literal_names_stay_apart(name in module_name()) {
            let literal = flatten(&name);
            if literal != name {
                prop_assert_ne!(staged_destination(&name), staged_destination(&literal));
            }
        }
    }
}
