//! Host interpreter backed scanner and importer.
//!
//! Both run a short script with the interpreter and read one JSON document
//! from the last line of its stdout.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::locate::SearchContext;

use super::{ModuleScanner, PackageImporter};

/// Environment variable overriding interpreter discovery.
pub const PYTHON_ENV: &str = "STATIK_PYTHON";

const SYS_PATH_SCRIPT: &str = "\
import json, sys
print(json.dumps([p for p in sys.path if p]))
";

const SCAN_SCRIPT: &str = "\
import json, sys
from modulefinder import ModuleFinder
finder = ModuleFinder(path=json.loads(sys.argv[2]))
finder.run_script(sys.argv[1])
print(json.dumps(sorted(finder.modules.keys())))
";

const MEMBERS_SCRIPT: &str = "\
import importlib, json, sys, types
sys.path[:0] = json.loads(sys.argv[2])
module = importlib.import_module(sys.argv[1])
names = {v.__name__ for v in vars(module).values() if isinstance(v, types.ModuleType)}
print(json.dumps(sorted(names)))
";

/// The host-language interpreter.
#[derive(Debug, Clone)]
pub struct PythonInterpreter {
    program: PathBuf,
}

impl PythonInterpreter {
    /// Use a specific interpreter executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find the interpreter: `$STATIK_PYTHON`, then `python3`, then `python`.
    pub fn detect() -> Result<Self> {
        if let Ok(program) = std::env::var(PYTHON_ENV) {
            return Ok(Self::new(program));
        }

        which::which("python3")
            .or_else(|_| which::which("python"))
            .map(Self::new)
            .map_err(|_| Error::Toolchain("python interpreter not found in PATH".to_string()))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The interpreter's module search path.
    pub fn sys_path(&self) -> Result<Vec<PathBuf>> {
        let paths: Vec<PathBuf> = self.run_json(SYS_PATH_SCRIPT, std::iter::empty::<&str>())?;
        Ok(paths)
    }

    /// Run `script` with `args` and decode the JSON on its last stdout line.
    fn run_json<T, I, A>(&self, script: &str, args: I) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let output = Command::new(&self.program)
            .arg("-c")
            .arg(script)
            .args(args)
            .output()
            .map_err(|e| {
                Error::Toolchain(format!("Failed to run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Toolchain(last_line(&stderr).to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(serde_json::from_str(last_line(&stdout))?)
    }
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

fn search_json(search: &SearchContext) -> Result<String> {
    Ok(serde_json::to_string(search.dirs())?)
}

/// Dependency scanner running `modulefinder` in the host interpreter.
#[derive(Debug, Clone)]
pub struct PythonScanner {
    python: PythonInterpreter,
}

impl PythonScanner {
    pub fn new(python: PythonInterpreter) -> Self {
        Self { python }
    }
}

impl ModuleScanner for PythonScanner {
    fn scan(&self, entry: &Path, search: &SearchContext) -> Result<BTreeSet<String>> {
        tracing::debug!("Scanning imports of {}", entry.display());
        let paths = search_json(search)?;
        let names: Vec<String> = self
            .python
            .run_json(SCAN_SCRIPT, [entry.as_os_str(), OsStr::new(&paths)])
            .map_err(|e| Error::Scan {
                entry: entry.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(names.into_iter().collect())
    }
}

/// Package importer that imports modules in the host interpreter.
#[derive(Debug, Clone)]
pub struct PythonImporter {
    python: PythonInterpreter,
}

impl PythonImporter {
    pub fn new(python: PythonInterpreter) -> Self {
        Self { python }
    }
}

impl PackageImporter for PythonImporter {
    fn members(&self, module: &str, search: &SearchContext) -> Result<Vec<String>> {
        let paths = search_json(search)?;
        self.python
            .run_json(MEMBERS_SCRIPT, [module, paths.as_str()])
            .map_err(|e| Error::PackageImport {
                package: module.to_string(),
                message: e.to_string(),
            })
    }
}
