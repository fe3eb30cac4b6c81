//! End-to-end resolution over a nested `node_modules` tree.
//!
//! Fixture layout:
//!
//! ```text
//! package.json                      @fixtures/resolution, depends on a and b
//! src/main.js                       imports a, b
//! node_modules/a                    1.0.0, imports c
//! node_modules/b                    1.0.0, imports its own a and side-effect
//! node_modules/b/node_modules/a     2.0.0
//! node_modules/c                    1.0.0
//! node_modules/side-effect          1.0.0
//! node_modules/unused               1.0.0, never imported
//! ```

use bundle_sbom::analyzer::{ModuleInfo, OutputBundle};
use bundle_sbom::pipeline::MemoryEmitter;
use bundle_sbom::{SbomConfig, SbomPlugin};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fixture.package(
            "",
            r#"{"name": "@fixtures/resolution", "version": "1.0.0",
                "dependencies": {"a": "^1.0.0", "b": "^1.0.0"}}"#,
        );
        fixture.package("node_modules/a", r#"{"name": "a", "version": "1.0.0"}"#);
        fixture.package("node_modules/b", r#"{"name": "b", "version": "1.0.0"}"#);
        fixture.package(
            "node_modules/b/node_modules/a",
            r#"{"name": "a", "version": "2.0.0"}"#,
        );
        fixture.package("node_modules/c", r#"{"name": "c", "version": "1.0.0"}"#);
        fixture.package(
            "node_modules/side-effect",
            r#"{"name": "side-effect", "version": "1.0.0"}"#,
        );
        fixture.package("node_modules/unused", r#"{"name": "unused", "version": "1.0.0"}"#);
        fixture
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn package(&self, dir: &str, manifest: &str) {
        let dir = self.root().join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), manifest).unwrap();
    }

    fn module(&self, relative: &str) -> String {
        let path: PathBuf = self.root().join(relative);
        path.to_string_lossy().into_owned()
    }

    fn modules(&self) -> Vec<ModuleInfo> {
        vec![
            ModuleInfo::new(self.module("src/main.js")).with_imports([
                self.module("node_modules/a/index.js"),
                self.module("node_modules/b/index.js"),
            ]),
            ModuleInfo::new(self.module("node_modules/a/index.js"))
                .with_imports([self.module("node_modules/c/index.js")]),
            ModuleInfo::new(self.module("node_modules/b/index.js")).with_imports([
                self.module("node_modules/b/node_modules/a/index.js"),
                self.module("node_modules/side-effect/index.js"),
            ]),
            ModuleInfo::new(self.module("node_modules/b/node_modules/a/index.js")),
            ModuleInfo::new(self.module("node_modules/c/index.js")),
            ModuleInfo::new(self.module("node_modules/side-effect/index.js")),
        ]
    }

    fn bundle(&self) -> OutputBundle {
        OutputBundle::new()
            .with_chunk(
                "index.js",
                [
                    self.module("src/main.js"),
                    self.module("node_modules/a/index.js"),
                    self.module("node_modules/c/index.js"),
                    self.module("node_modules/b/index.js"),
                    self.module("node_modules/b/node_modules/a/index.js"),
                    self.module("node_modules/side-effect/index.js"),
                ],
            )
            .with_asset("style.css")
    }

    async fn generate(&self, config: SbomConfig) -> (MemoryEmitter, bundle_sbom::Bom) {
        let emitter = MemoryEmitter::new();
        let mut plugin = SbomPlugin::new(config, self.root());
        plugin.build_start().await.unwrap();
        for info in self.modules() {
            plugin.module_parsed(info).unwrap();
        }
        let bom = plugin
            .generate_bundle(&self.bundle(), &emitter)
            .await
            .unwrap();
        (emitter, bom)
    }
}

fn config() -> SbomConfig {
    SbomConfig::builder()
        .out_dir("plugin-outdir")
        .out_filename("filename")
        .build()
}

fn json_document(emitter: &MemoryEmitter) -> Value {
    let content = emitter.get("plugin-outdir/filename.json").unwrap();
    serde_json::from_str(&content).unwrap()
}

fn depends_on<'a>(doc: &'a Value, suffix: &str) -> Option<Vec<&'a str>> {
    let entry = doc["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["ref"].as_str().unwrap().ends_with(suffix))
        .unwrap_or_else(|| panic!("no dependency entry for {suffix}"));
    entry["dependsOn"]
        .as_array()
        .map(|refs| refs.iter().map(|r| r.as_str().unwrap()).collect())
}

#[tokio::test]
async fn test_emits_configured_files() {
    let fixture = Fixture::new();
    let (emitter, _) = fixture.generate(config()).await;

    assert_eq!(
        emitter.file_names(),
        vec![
            "plugin-outdir/filename.json",
            "plugin-outdir/filename.xml",
            ".well-known/sbom"
        ]
    );
    assert_eq!(
        emitter.get(".well-known/sbom"),
        emitter.get("plugin-outdir/filename.json")
    );
}

#[tokio::test]
async fn test_autodetects_scoped_root() {
    let fixture = Fixture::new();
    let (emitter, _) = fixture.generate(config()).await;
    let doc = json_document(&emitter);

    let root = &doc["metadata"]["component"];
    assert_eq!(root["type"], "application");
    assert_eq!(root["name"], "resolution");
    assert_eq!(root["group"], "@fixtures");
    assert_eq!(root["bom-ref"], "pkg:npm/%40fixtures/resolution@1.0.0");
}

#[tokio::test]
async fn test_detects_all_used_components() {
    let fixture = Fixture::new();
    let (emitter, _) = fixture.generate(config()).await;
    let doc = json_document(&emitter);

    let mut found: Vec<(String, String)> = doc["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            (
                c["name"].as_str().unwrap().to_string(),
                c["version"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    found.sort();

    let expected: Vec<(String, String)> = [
        ("a", "1.0.0"),
        ("a", "2.0.0"),
        ("b", "1.0.0"),
        ("c", "1.0.0"),
        ("side-effect", "1.0.0"),
    ]
    .iter()
    .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
    .collect();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn test_dependency_relations_follow_owning_package() {
    let fixture = Fixture::new();
    let (emitter, _) = fixture.generate(config()).await;
    let doc = json_document(&emitter);

    assert_eq!(depends_on(&doc, "a@1.0.0"), Some(vec!["pkg:npm/c@1.0.0"]));
    assert_eq!(depends_on(&doc, "a@2.0.0"), None);
    assert_eq!(
        depends_on(&doc, "b@1.0.0"),
        Some(vec!["pkg:npm/a@2.0.0", "pkg:npm/side-effect@1.0.0"])
    );
    assert_eq!(depends_on(&doc, "c@1.0.0"), None);
    assert_eq!(depends_on(&doc, "side-effect@1.0.0"), None);
    // Root edges match on the declared name, so the nested copy of a links too
    assert_eq!(
        depends_on(&doc, "resolution@1.0.0"),
        Some(vec!["pkg:npm/a@1.0.0", "pkg:npm/b@1.0.0", "pkg:npm/a@2.0.0"])
    );
}

#[tokio::test]
async fn test_resolve_limit_bounds_nested_packages() {
    let fixture = Fixture::new();
    let config = SbomConfig::builder().resolve_limit(0).build();
    let (_, bom) = fixture.generate(config).await;

    // Chunk modules are still listed, their imports are not followed
    assert_eq!(bom.component_count(), 5);
    assert!(bom.dependencies_of("pkg:npm/a@1.0.0").is_empty());
    assert!(bom.dependencies_of("pkg:npm/b@1.0.0").is_empty());
}

#[tokio::test]
async fn test_xml_output_carries_same_graph() {
    let fixture = Fixture::new();
    let (emitter, _) = fixture.generate(config()).await;
    let xml = emitter.get("plugin-outdir/filename.xml").unwrap();

    assert!(xml.contains(r#"<bom xmlns="http://cyclonedx.org/schema/bom/1.5""#));
    assert!(xml.contains(r#"<dependency ref="pkg:npm/b@1.0.0">"#));
    assert!(xml.contains(r#"<dependency ref="pkg:npm/side-effect@1.0.0"/>"#));
    assert!(!xml.contains("unused"));
}
