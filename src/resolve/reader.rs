//! Package manifest reading and normalization.
//!
//! `package.json` allows several shapes for most fields (strings, objects,
//! legacy arrays, hosted-git shorthands). This module collapses them into a
//! [`PackageManifest`]. It never caches; the registry owns caching.

use crate::error::{ManifestErrorKind, Result, SbomError};
use crate::model::PackageManifest;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File name of a package manifest.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Raw manifest as found on disk, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawManifest {
    name: Value,
    version: Value,
    description: Value,
    license: Value,
    licenses: Value,
    author: Value,
    homepage: Value,
    repository: Value,
    bugs: Value,
    dependencies: Value,
}

/// Resolve a directory or a direct manifest path to the manifest file path.
#[must_use]
pub fn manifest_path(dir_or_file: &Path) -> PathBuf {
    if dir_or_file.file_name().is_some_and(|name| name == MANIFEST_FILE_NAME) {
        dir_or_file.to_path_buf()
    } else {
        dir_or_file.join(MANIFEST_FILE_NAME)
    }
}

/// Read and normalize a manifest from a directory or a `package.json` path.
pub async fn read_manifest(dir_or_file: &Path) -> Result<PackageManifest> {
    let path = manifest_path(dir_or_file);
    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            ManifestErrorKind::NotFound
        } else {
            ManifestErrorKind::Io(e)
        };
        SbomError::manifest(&path, kind)
    })?;

    parse_manifest(&content).map_err(|kind| SbomError::manifest(&path, kind))
}

/// Parse and normalize manifest content.
pub fn parse_manifest(content: &str) -> std::result::Result<PackageManifest, ManifestErrorKind> {
    let value: Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(ManifestErrorKind::NotAnObject);
    }
    let raw: RawManifest = serde_json::from_value(value)?;
    Ok(normalize(raw))
}

fn normalize(raw: RawManifest) -> PackageManifest {
    let repository = normalize_repository(&raw.repository);
    let hosted = repository.as_deref().and_then(HostedRepo::parse);

    let homepage = non_empty_str(&raw.homepage)
        .or_else(|| hosted.as_ref().map(HostedRepo::homepage));
    let bugs = normalize_url_field(&raw.bugs)
        .or_else(|| hosted.as_ref().and_then(HostedRepo::bugs));

    PackageManifest {
        name: non_empty_str(&raw.name),
        version: non_empty_str(&raw.version).map(|v| normalize_version(&v)),
        description: non_empty_str(&raw.description),
        license: normalize_license(&raw.license, &raw.licenses),
        author: normalize_person(&raw.author),
        homepage,
        repository,
        bugs,
        dependencies: raw
            .dependencies
            .as_object()
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, range)| {
                        range.as_str().map(|r| (name.clone(), r.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Canonical semver form when the version parses, the trimmed input otherwise.
fn normalize_version(version: &str) -> String {
    let stripped = version.trim_start_matches(['v', '=']).trim();
    semver::Version::parse(stripped).map_or_else(|_| version.to_string(), |v| v.to_string())
}

/// `license` string, legacy `{type}` object, or legacy `licenses` array.
fn normalize_license(license: &Value, licenses: &Value) -> Option<String> {
    let typed = |v: &Value| {
        non_empty_str(v).or_else(|| v.get("type").and_then(non_empty_str))
    };

    if let Some(license) = typed(license) {
        return Some(license);
    }

    let legacy: Vec<String> = licenses
        .as_array()
        .map(|items| items.iter().filter_map(typed).collect())
        .unwrap_or_default();
    match legacy.len() {
        0 => None,
        1 => legacy.into_iter().next(),
        _ => Some(format!("({})", legacy.join(" OR "))),
    }
}

/// Person as a string or `{name, email, url}`, rendered `name <email> (url)`.
fn normalize_person(value: &Value) -> Option<String> {
    if let Some(s) = non_empty_str(value) {
        return Some(s);
    }
    let name = value.get("name").and_then(non_empty_str)?;
    let mut rendered = name;
    if let Some(email) = value.get("email").and_then(non_empty_str) {
        rendered.push_str(&format!(" <{email}>"));
    }
    if let Some(url) = value.get("url").and_then(non_empty_str) {
        rendered.push_str(&format!(" ({url})"));
    }
    Some(rendered)
}

fn normalize_url_field(value: &Value) -> Option<String> {
    non_empty_str(value).or_else(|| value.get("url").and_then(non_empty_str))
}

/// Repository URL with hosted-git shorthands expanded.
fn normalize_repository(value: &Value) -> Option<String> {
    let url = normalize_url_field(value)?;
    Some(expand_repository_shorthand(&url).unwrap_or(url))
}

fn expand_repository_shorthand(url: &str) -> Option<String> {
    let (host, path) = if let Some(rest) = url.strip_prefix("github:") {
        ("github.com", rest)
    } else if let Some(rest) = url.strip_prefix("gitlab:") {
        ("gitlab.com", rest)
    } else if let Some(rest) = url.strip_prefix("bitbucket:") {
        ("bitbucket.org", rest)
    } else if !url.contains(':') && url.matches('/').count() == 1 && !url.starts_with('.') {
        ("github.com", url)
    } else {
        return None;
    };
    let path = path.trim_end_matches(".git");
    Some(format!("git+https://{host}/{path}.git"))
}

/// A repository on a known git host, used to infer homepage and bugs URLs.
struct HostedRepo {
    host: String,
    path: String,
}

impl HostedRepo {
    fn parse(url: &str) -> Option<Self> {
        let without_scheme = url
            .trim_start_matches("git+")
            .split_once("://")
            .map(|(_, rest)| rest)?;
        let without_user = without_scheme
            .split_once('@')
            .map_or(without_scheme, |(_, rest)| rest);
        let (host, path) = without_user.split_once('/')?;
        let host = host.trim_end_matches(":22");
        if !matches!(host, "github.com" | "gitlab.com" | "bitbucket.org") {
            return None;
        }
        let path = path.trim_end_matches('/').trim_end_matches(".git");
        if path.split('/').count() != 2 {
            return None;
        }
        Some(Self {
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    fn homepage(&self) -> String {
        format!("https://{}/{}#readme", self.host, self.path)
    }

    fn bugs(&self) -> Option<String> {
        match self.host.as_str() {
            "github.com" | "gitlab.com" => Some(format!("https://{}/{}/issues", self.host, self.path)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_manifest() {
        let manifest = parse_manifest(r#"{"name": "a", "version": "1.0.0"}"#).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("a"));
        assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn test_missing_version_is_not_identifiable() {
        let manifest = parse_manifest(r#"{"name": "proxy", "main": "../dist/x.js"}"#).unwrap();
        assert!(!manifest.is_identifiable());
    }

    #[test]
    fn test_version_is_cleaned() {
        let manifest = parse_manifest(r#"{"name": "a", "version": " v1.2.3 "}"#).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));

        let manifest = parse_manifest(r#"{"name": "a", "version": "*"}"#).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("*"));
    }

    #[test]
    fn test_non_string_fields_are_dropped() {
        let manifest = parse_manifest(r#"{"name": 42, "version": ["1"]}"#).unwrap();
        assert!(manifest.name.is_none());
        assert!(manifest.version.is_none());
    }

    #[test]
    fn test_dependencies_kept_verbatim() {
        let manifest = parse_manifest(
            r#"{"name": "app", "version": "1.0.0",
                "dependencies": {"react": "^18.0.0", "local": "file:../local", "bad": 1}}"#,
        )
        .unwrap();
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.dependencies["react"], "^18.0.0");
        assert_eq!(manifest.dependencies["local"], "file:../local");
    }

    #[test]
    fn test_legacy_license_shapes() {
        let manifest = parse_manifest(r#"{"license": {"type": "MIT"}}"#).unwrap();
        assert_eq!(manifest.license.as_deref(), Some("MIT"));

        let manifest =
            parse_manifest(r#"{"licenses": [{"type": "MIT"}, {"type": "Apache-2.0"}]}"#).unwrap();
        assert_eq!(manifest.license.as_deref(), Some("(MIT OR Apache-2.0)"));
    }

    #[test]
    fn test_author_object() {
        let manifest = parse_manifest(
            r#"{"author": {"name": "Jane", "email": "jane@example.com", "url": "https://jane.dev"}}"#,
        )
        .unwrap();
        assert_eq!(
            manifest.author.as_deref(),
            Some("Jane <jane@example.com> (https://jane.dev)")
        );
    }

    #[test]
    fn test_repository_shorthand_and_inferred_urls() {
        let manifest = parse_manifest(r#"{"repository": "facebook/react"}"#).unwrap();
        assert_eq!(
            manifest.repository.as_deref(),
            Some("git+https://github.com/facebook/react.git")
        );
        assert_eq!(
            manifest.homepage.as_deref(),
            Some("https://github.com/facebook/react#readme")
        );
        assert_eq!(
            manifest.bugs.as_deref(),
            Some("https://github.com/facebook/react/issues")
        );
    }

    #[test]
    fn test_explicit_urls_win_over_inferred() {
        let manifest = parse_manifest(
            r#"{"homepage": "https://react.dev",
                "repository": {"type": "git", "url": "https://github.com/facebook/react.git"},
                "bugs": {"url": "https://example.com/bugs"}}"#,
        )
        .unwrap();
        assert_eq!(manifest.homepage.as_deref(), Some("https://react.dev"));
        assert_eq!(
            manifest.repository.as_deref(),
            Some("https://github.com/facebook/react.git")
        );
        assert_eq!(manifest.bugs.as_deref(), Some("https://example.com/bugs"));
    }

    #[test]
    fn test_non_object_manifest_is_rejected() {
        assert!(matches!(
            parse_manifest("[1, 2]"),
            Err(ManifestErrorKind::NotAnObject)
        ));
        assert!(matches!(
            parse_manifest("{ not json"),
            Err(ManifestErrorKind::InvalidJson(_))
        ));
    }

    #[test]
    fn test_manifest_path_accepts_dir_or_file() {
        assert_eq!(
            manifest_path(Path::new("/a/b")),
            PathBuf::from("/a/b/package.json")
        );
        assert_eq!(
            manifest_path(Path::new("/a/b/package.json")),
            PathBuf::from("/a/b/package.json")
        );
    }

    #[tokio::test]
    async fn test_read_manifest_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_manifest(dir.path()).await.unwrap_err();
        assert!(matches!(
            err,
            SbomError::ManifestUnreadable {
                source: ManifestErrorKind::NotFound,
                ..
            }
        ));
    }
}
