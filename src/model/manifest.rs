//! Normalized package manifest.

use super::PackageId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Normalized contents of a `package.json`.
///
/// Produced by [`crate::resolve::parse_manifest`]; every field that the raw
/// manifest allows in several shapes is already collapsed to one here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name, including any `@scope/` prefix
    pub name: Option<String>,
    /// Package version (canonical semver when it parses, verbatim otherwise)
    pub version: Option<String>,
    /// Short description
    pub description: Option<String>,
    /// License expression or name
    pub license: Option<String>,
    /// Author rendered as `name <email> (url)`
    pub author: Option<String>,
    /// Homepage URL
    pub homepage: Option<String>,
    /// Repository URL
    pub repository: Option<String>,
    /// Issue tracker URL
    pub bugs: Option<String>,
    /// Runtime dependencies, name -> range, unmodified
    pub dependencies: IndexMap<String, String>,
}

impl PackageManifest {
    /// Create a manifest with just a name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    /// True if both name and version are present
    #[must_use]
    pub fn is_identifiable(&self) -> bool {
        self.name.is_some() && self.version.is_some()
    }

    /// Package identifier, if the manifest carries both name and version
    #[must_use]
    pub fn package_id(&self) -> Option<PackageId> {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => Some(PackageId::new(name.clone(), version.clone())),
            _ => None,
        }
    }

    /// npm scope (with `@`) and bare name
    #[must_use]
    pub fn scope_and_name(&self) -> Option<(Option<&str>, &str)> {
        let name = self.name.as_deref()?;
        Some(split_scoped_name(name))
    }

    /// True if `dependencies` declares a package with this name
    #[must_use]
    pub fn declares_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }
}

/// Split `@scope/name` into `(Some("@scope"), "name")`.
#[must_use]
pub fn split_scoped_name(name: &str) -> (Option<&str>, &str) {
    if name.starts_with('@') {
        if let Some((scope, bare)) = name.split_once('/') {
            return (Some(scope), bare);
        }
    }
    (None, name)
}
