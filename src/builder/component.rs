//! Conversion of normalized manifests into BOM components.

use crate::error::{Result, SbomError, SerializeErrorKind};
use crate::model::{
    split_scoped_name, BomComponent, ComponentType, ExternalRefType, ExternalReference, License,
    PackageManifest,
};
use packageurl::PackageUrl;

/// npm package URL, e.g. `pkg:npm/%40babel/core@7.0.0`.
pub fn npm_purl(name: &str, version: Option<&str>) -> Result<String> {
    let (scope, bare) = split_scoped_name(name);
    let mut purl = PackageUrl::new("npm", bare).map_err(|e| {
        SbomError::serialize(
            format!("purl for {name}"),
            SerializeErrorKind::Purl(e.to_string()),
        )
    })?;
    if let Some(scope) = scope {
        purl.with_namespace(scope);
    }
    if let Some(version) = version {
        purl.with_version(version);
    }
    Ok(purl.to_string())
}

/// Build a component from a manifest.
///
/// The manifest must carry a name; the version is optional so an
/// unpublished root application can still be described. The purl doubles
/// as the `bom-ref`.
pub fn component_from_manifest(
    manifest: &PackageManifest,
    component_type: ComponentType,
) -> Result<BomComponent> {
    let full_name = manifest
        .name
        .as_deref()
        .ok_or_else(|| SbomError::input("manifest has no name"))?;
    let (scope, bare) = split_scoped_name(full_name);

    let purl = npm_purl(full_name, manifest.version.as_deref())?;

    let mut component = BomComponent::new(bare, component_type);
    component.group = scope.map(ToString::to_string);
    component.version.clone_from(&manifest.version);
    component.description.clone_from(&manifest.description);
    component.author.clone_from(&manifest.author);
    component.licenses = manifest
        .license
        .as_deref()
        .map(License::from_declared)
        .into_iter()
        .collect();
    component.external_refs = external_references(manifest);
    component.bom_ref.clone_from(&purl);
    component.purl = Some(purl);

    Ok(component)
}

fn external_references(manifest: &PackageManifest) -> Vec<ExternalReference> {
    [
        (ExternalRefType::Website, "homepage", &manifest.homepage),
        (ExternalRefType::Vcs, "repository", &manifest.repository),
        (ExternalRefType::IssueTracker, "bugs", &manifest.bugs),
    ]
    .into_iter()
    .filter_map(|(ref_type, field, url)| {
        url.as_ref().map(|url| ExternalReference {
            ref_type,
            url: url.clone(),
            comment: Some(format!("as detected from package.json property \"{field}\"")),
        })
    })
    .collect()
}
