//! Error types for statik-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for statik-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in statik-core.
#[derive(Debug, Error)]
pub enum Error {
    /// The build manifest does not exist.
    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    /// An explicitly requested module could not be found anywhere.
    #[error("couldn't find module {0}")]
    ModuleNotFound(String),

    /// A requested name is not a valid dotted module name.
    #[error("invalid module name: {0}")]
    InvalidModuleName(String),

    /// A module could not be located while materializing it.
    #[error("module {0} could not be resolved")]
    Unresolvable(String),

    /// A byte-compiled module has no source file next to it.
    #[error("lone byte-compiled file {}", .0.display())]
    LoneBytecode(PathBuf),

    /// No native source was found for a prebuilt extension module.
    #[error("couldn't find native source for {module} ({})", binary.display())]
    MissingNativeSource { module: String, binary: PathBuf },

    /// The transpiler failed to translate a module.
    #[error("failed to translate {module}: {message}")]
    Transpile { module: String, message: String },

    /// A package could not be imported for traversal.
    #[error("failed to import package {package}: {message}")]
    PackageImport { package: String, message: String },

    /// The dependency scanner failed.
    #[error("dependency scan of {} failed: {message}", entry.display())]
    Scan { entry: PathBuf, message: String },

    /// The staged artifact is not a compilable translation unit.
    #[error("unknown file: {}", .0.display())]
    UnknownArtifact(PathBuf),

    /// Two distinct module names flatten to the same staged file.
    #[error("{name} flattens to {flattened}, already used by {existing}")]
    FlattenCollision {
        name: String,
        flattened: String,
        existing: String,
    },

    /// Malformed source override specification.
    #[error("invalid source override: {0}")]
    InvalidOverride(String),

    /// External tool could not be found or run.
    #[error("toolchain error: {0}")]
    Toolchain(String),

    /// Malformed output from an external tool.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl Error {
    /// Whether this error aborts the whole run rather than a single module.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ManifestNotFound(_)
                | Self::ModuleNotFound(_)
                | Self::InvalidModuleName(_)
                | Self::InvalidOverride(_)
        )
    }

    /// Render the error together with a recovery hint, when one applies.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Self::ManifestNotFound(_) => {
                Some("generate Modules/Setup first, or point --root at the runtime source tree")
            }
            Self::ModuleNotFound(_) => Some("add its directory with --path, or check the spelling"),
            Self::MissingNativeSource { .. } => {
                Some("pass the package's source tree with --src pkg:/path/to/src")
            }
            Self::LoneBytecode(_) => Some("ship the .py source next to the .pyc"),
            Self::Toolchain(_) => Some("set STATIK_PYTHON or STATIK_CYTHON to the tool's path"),
            Self::FlattenCollision { .. } => Some("exclude one of the modules with --exclude"),
            _ => None,
        };

        match hint {
            Some(hint) => format!("{self}\n  hint: {hint}"),
            None => self.to_string(),
        }
    }
}
