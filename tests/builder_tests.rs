//! Integration tests for package resolution and BOM graph building against
//! real `node_modules` trees on disk.

use bundle_sbom::analyzer::{ModuleInfo, ModuleRegistry, OutputBundle};
use bundle_sbom::builder::component_from_manifest;
use bundle_sbom::model::{Bom, ComponentType, License, SpecVersion};
use bundle_sbom::resolve::{read_manifest, DependencyInfoRegistry, LicenseFileGatherer};
use bundle_sbom::serialize::{BomSerializer, JsonSerializer};
use bundle_sbom::{BomGraphBuilder, ExternalModuleAnalyzer};
use std::fs;
use std::path::Path;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn id(root: &Path, relative: &str) -> String {
    root.join(relative).to_string_lossy().into_owned()
}

/// Runs analyzer and builder over `modules`, with every module in one chunk
async fn build(
    registry: &DependencyInfoRegistry,
    modules: Vec<ModuleInfo>,
) -> (Bom, bundle_sbom::BuildSummary) {
    let mut bom = Bom::new(SpecVersion::V1_5);
    let summary = build_into(registry, modules, &mut bom).await;
    (bom, summary)
}

async fn build_into(
    registry: &DependencyInfoRegistry,
    modules: Vec<ModuleInfo>,
    bom: &mut Bom,
) -> bundle_sbom::BuildSummary {
    let chunk: Vec<String> = modules.iter().map(|m| m.id.as_str().to_string()).collect();
    let graph: ModuleRegistry = modules.into_iter().collect();
    let bundle = OutputBundle::new().with_chunk("index.js", chunk);

    let records = ExternalModuleAnalyzer::new(&graph).analyze(&bundle).await;
    BomGraphBuilder::new(registry).build(&records, bom).await
}

#[tokio::test]
async fn test_nested_versionless_manifest_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(root, "node_modules/lib/package.json", r#"{"name": "lib", "version": "3.1.0"}"#);
    // Module-format marker files carry no identity
    write(root, "node_modules/lib/esm/package.json", r#"{"type": "module"}"#);

    let registry = DependencyInfoRegistry::default();
    let (bom, summary) = build(
        &registry,
        vec![ModuleInfo::new(id(root, "node_modules/lib/esm/index.js"))],
    )
    .await;

    assert_eq!(summary.components, 1);
    let component = bom.components.values().next().unwrap();
    assert_eq!(component.bom_ref, "pkg:npm/lib@3.1.0");
}

#[tokio::test]
async fn test_repository_root_stops_resolution() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join(".git")).unwrap();
    write(root, "node_modules/known/package.json", r#"{"name": "known", "version": "1.0.0"}"#);
    fs::create_dir_all(root.join("node_modules/.vite/deps")).unwrap();

    let registry = DependencyInfoRegistry::default();
    let (bom, summary) = build(
        &registry,
        vec![
            ModuleInfo::new(id(root, "node_modules/.vite/deps/chunk.js"))
                .with_imports([id(root, "node_modules/known/index.js")]),
            ModuleInfo::new(id(root, "node_modules/known/index.js")),
        ],
    )
    .await;

    // Its importer is skipped, the imported package is still recorded
    assert_eq!(summary.skipped, 1);
    assert_eq!(bom.component_count(), 1);
    assert!(bom.components.values().all(|c| c.name == "known"));
}

#[tokio::test]
async fn test_vendored_module_owned_by_project_stays_the_root() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join(".git")).unwrap();
    write(root, "package.json", r#"{"name": "app", "version": "1.0.0"}"#);
    write(root, "node_modules/known/package.json", r#"{"name": "known", "version": "1.0.0"}"#);
    fs::create_dir_all(root.join("node_modules/.vite/deps")).unwrap();

    let manifest = read_manifest(root).await.unwrap();
    let mut bom = Bom::new(SpecVersion::V1_5);
    bom.set_root_component(component_from_manifest(&manifest, ComponentType::Application).unwrap());

    let registry = DependencyInfoRegistry::default();
    let summary = build_into(
        &registry,
        vec![
            ModuleInfo::new(id(root, "node_modules/.vite/deps/chunk.js"))
                .with_imports([id(root, "node_modules/known/index.js")]),
            ModuleInfo::new(id(root, "node_modules/known/index.js")),
        ],
        &mut bom,
    )
    .await;

    // The pre-bundled chunk resolves to the project manifest
    assert_eq!(summary.components, 1);
    assert_eq!(bom.component_count(), 1);
    assert!(bom.components.values().all(|c| c.bom_ref != "pkg:npm/app@1.0.0"));
    assert_eq!(bom.dependencies_of("pkg:npm/app@1.0.0"), vec!["pkg:npm/known@1.0.0"]);

    let json = JsonSerializer::new().serialize(&bom).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    let refs: Vec<&str> = doc["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["bom-ref"].as_str().unwrap())
        .collect();
    assert_eq!(refs, vec!["pkg:npm/known@1.0.0"]);
    assert_eq!(doc["metadata"]["component"]["bom-ref"], "pkg:npm/app@1.0.0");
}

#[tokio::test]
async fn test_modules_of_one_package_share_a_resolution() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(root, "node_modules/lib/package.json", r#"{"name": "lib", "version": "1.0.0"}"#);

    let registry = DependencyInfoRegistry::default();
    let (bom, summary) = build(
        &registry,
        vec![
            ModuleInfo::new(id(root, "node_modules/lib/index.js"))
                .with_imports([id(root, "node_modules/lib/util.js")]),
            ModuleInfo::new(id(root, "node_modules/lib/util.js")),
        ],
    )
    .await;

    assert_eq!(registry.len(), 1);
    assert_eq!(summary.components, 1);
    assert!(bom.dependencies_of("pkg:npm/lib@1.0.0").is_empty());
}

#[tokio::test]
async fn test_license_evidence_reaches_the_document() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(
        root,
        "node_modules/lib/package.json",
        r#"{"name": "lib", "version": "1.0.0", "license": "MIT"}"#,
    );
    write(root, "node_modules/lib/LICENSE", "MIT License\n\nCopyright (c) lib authors");

    let registry = DependencyInfoRegistry::default().with_license_evidence(LicenseFileGatherer);
    let (mut bom, _) = build(
        &registry,
        vec![ModuleInfo::new(id(root, "node_modules/lib/index.js"))],
    )
    .await;

    let component = bom.components.values().next().unwrap();
    assert_eq!(
        component.license_evidence,
        vec![License::file_evidence(
            "LICENSE",
            "MIT License\n\nCopyright (c) lib authors"
        )]
    );

    let json = JsonSerializer::new().serialize(&bom).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    let evidence = &doc["components"][0]["evidence"]["licenses"][0]["license"];
    assert_eq!(evidence["name"], "file: LICENSE");
    assert_eq!(doc["components"][0]["licenses"][0]["license"]["id"], "MIT");

    bom.spec_version = SpecVersion::V1_4;
    let json = JsonSerializer::new().serialize(&bom).unwrap();
    assert!(!json.contains("file: LICENSE"));
}
