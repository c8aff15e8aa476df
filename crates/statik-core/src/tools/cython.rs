//! Cython-backed source-to-C translation.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

use super::Transpiler;

/// Environment variable overriding transpiler discovery.
pub const CYTHON_ENV: &str = "STATIK_CYTHON";

/// Runs `cython` to turn `.py`/`.pyx` modules into C translation units.
#[derive(Debug, Clone)]
pub struct CythonTranspiler {
    program: PathBuf,
    language_level: u8,
}

impl CythonTranspiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            language_level: 3,
        }
    }

    /// Find `cython`: `$STATIK_CYTHON`, then `cython`, then `cython3` in PATH.
    ///
    /// Falls back to a bare `cython`, so a missing transpiler only surfaces
    /// once a module actually needs translating.
    pub fn detect() -> Self {
        if let Ok(program) = std::env::var(CYTHON_ENV) {
            return Self::new(program);
        }

        let program = which::which("cython")
            .or_else(|_| which::which("cython3"))
            .unwrap_or_else(|_| PathBuf::from("cython"));
        Self::new(program)
    }

    /// Set the source language level (`-2` / `-3`).
    pub fn with_language_level(mut self, level: u8) -> Self {
        self.language_level = level;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Transpiler for CythonTranspiler {
    fn translate(&self, source: &Path) -> Result<PathBuf> {
        let output_path = source.with_extension("c");
        let module = source.display().to_string();

        tracing::info!("Translating {}", source.display());

        let output = Command::new(&self.program)
            .arg(format!("-{}", self.language_level))
            .arg(source)
            .arg("-o")
            .arg(&output_path)
            .output()
            .map_err(|e| {
                Error::Toolchain(format!("Failed to run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Transpile {
                module,
                message: stderr.trim().to_string(),
            });
        }

        if !output_path.is_file() {
            return Err(Error::Transpile {
                module,
                message: format!("no output written to {}", output_path.display()),
            });
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let transpiler = CythonTranspiler::new("/nonexistent/cython");
        let err = transpiler.translate(Path::new("mod.py")).unwrap_err();
        assert!(matches!(err, Error::Toolchain(_)));
    }

    #[test]
    fn test_language_level() {
        let transpiler = CythonTranspiler::new("cython").with_language_level(2);
        assert_eq!(transpiler.language_level, 2);
        assert_eq!(transpiler.program(), Path::new("cython"));
    }
}
