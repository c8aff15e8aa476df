//! Typed lines of the build manifest.

use std::fmt;

use crate::locate::NATIVE_SOURCE_EXTS;
use crate::stage::naming::is_module_name;

/// A module registration: `<name> <target>[ <opts>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Module name as built into the runtime (flattened for package members).
    pub name: String,
    /// Native source, relative to `Modules/`.
    pub target: String,
    /// Remaining compiler/linker options, space-joined.
    pub opts: String,
}

impl Registration {
    pub fn new(name: impl Into<String>, target: impl Into<String>, opts: &[String]) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            opts: opts.join(" "),
        }
    }

    /// Parse `<identifier>(.<identifier>)* <words>`, where one of the words
    /// after the name is a native source path.
    ///
    /// The first such path is the target; every other word is kept in `opts`
    /// in its original order, so flag-first lines such as
    /// `_json -I$(srcdir)/Include/internal -DPy_BUILD_CORE_BUILTIN _json.c`
    /// are registrations too.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let name = tokens.next()?;
        if !is_module_name(name) {
            return None;
        }

        let rest: Vec<&str> = tokens.collect();
        let index = rest.iter().position(|token| is_native_source_path(token))?;
        let opts = rest
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, token)| *token)
            .collect::<Vec<_>>()
            .join(" ");

        Some(Self {
            name: name.to_string(),
            target: rest[index].to_string(),
            opts,
        })
    }
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.target)?;
        if !self.opts.is_empty() {
            write!(f, " {}", self.opts)?;
        }
        Ok(())
    }
}

fn is_native_source_path(target: &str) -> bool {
    !target.starts_with('-')
        && target
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && NATIVE_SOURCE_EXTS.contains(&ext))
}

/// One line of the build manifest.
///
/// Every variant keeps the line's original text so untouched lines are
/// written back byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    /// Empty or whitespace-only line.
    Blank(String),
    /// Comment that isn't a disabled registration.
    Comment(String),
    /// Commented-out registration, `#name target ...`.
    Disabled { entry: Registration, raw: String },
    /// Active registration.
    Active { entry: Registration, raw: String },
    /// Anything else (build directives, variable assignments, ...).
    Opaque(String),
}

impl ManifestLine {
    /// Classify one line of manifest text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Blank(raw.to_string());
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            // `# json ...` is prose, only `#json ...` is a disabled entry.
            let starts_tight = rest.chars().next().is_some_and(|c| !c.is_whitespace());
            return match Registration::parse(rest) {
                Some(entry) if starts_tight => Self::Disabled {
                    entry,
                    raw: raw.to_string(),
                },
                _ => Self::Comment(raw.to_string()),
            };
        }

        match Registration::parse(trimmed) {
            Some(entry) => Self::Active {
                entry,
                raw: raw.to_string(),
            },
            None => Self::Opaque(raw.to_string()),
        }
    }

    /// A freshly generated active line.
    pub fn active(entry: Registration) -> Self {
        let raw = entry.to_string();
        Self::Active { entry, raw }
    }

    /// Original (or generated) text of the line.
    pub fn text(&self) -> &str {
        match self {
            Self::Blank(raw) | Self::Comment(raw) | Self::Opaque(raw) => raw,
            Self::Disabled { raw, .. } | Self::Active { raw, .. } => raw,
        }
    }

    pub fn registration(&self) -> Option<&Registration> {
        match self {
            Self::Disabled { entry, .. } | Self::Active { entry, .. } => Some(entry),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Turn a disabled registration into an active one by dropping its `#`.
    pub(crate) fn enable(&mut self) -> bool {
        let Self::Disabled { entry, raw } = self else {
            return false;
        };
        let text = raw.trim().trim_start_matches('#').to_string();
        *self = Self::Active {
            entry: entry.clone(),
            raw: text,
        };
        true
    }
}
