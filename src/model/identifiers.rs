//! Identifiers flowing through the resolution engine.
//!
//! Three identifier spaces are kept apart by type:
//!
//! 1. [`ModuleId`] - one source file as the bundler knows it (may be virtual)
//! 2. [`ModulePath`] - the directory of a module id, the registry cache key
//! 3. [`PackageId`] - `name@version`, the deduplication key of the whole SBOM

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Sentinel character marking bundler-synthesized (virtual) modules.
pub const VIRTUAL_MODULE_SENTINEL: char = '\0';

/// Opaque module identifier as reported by the bundler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the bundler synthesized this module (sentinel anywhere in the id)
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.0.contains(VIRTUAL_MODULE_SENTINEL)
    }

    /// Directory portion of the identifier.
    ///
    /// Mirrors `dirname`: an id without any directory component maps to `.`.
    #[must_use]
    pub fn module_path(&self) -> ModulePath {
        match Path::new(&self.0).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => ModulePath(parent.to_path_buf()),
            Some(_) => ModulePath(PathBuf::from(".")),
            None => ModulePath(PathBuf::from(&self.0)),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.replace(VIRTUAL_MODULE_SENTINEL, "\\0"))
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModuleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Directory of a module identifier.
///
/// Used verbatim as the registry key: two ids in the same directory share one
/// resolution, and no normalization beyond `dirname` is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(PathBuf);

impl ModulePath {
    /// Wrap a directory path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The underlying path
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Lossy string form, used by the classifier
    #[must_use]
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'_, str> {
        self.0.to_string_lossy()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for ModulePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Package identity: `name@version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId {
    name: String,
    version: String,
}

impl PackageId {
    /// Create a package identifier
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Package name (including any `@scope/` prefix)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
