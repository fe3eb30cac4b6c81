//! Core BOM document and component data structures.

use super::{
    ComponentType, ExternalReference, License, LifecyclePhase, Organization, PackageId, Property,
    SpecVersion, Tool,
};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// BOM document produced by one build pass.
///
/// Components are keyed by [`PackageId`], so a package is exactly one node
/// no matter how many files or import sites reference it. Dependency edges are
/// keyed by `bom-ref` and include the root component's edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bom {
    /// `CycloneDX` specification version to render
    pub spec_version: SpecVersion,
    /// `urn:uuid:` serial number, if generation was requested
    pub serial_number: Option<String>,
    /// BOM version, incremented on updates
    pub version: u32,
    /// Document-level metadata
    pub metadata: BomMetadata,
    /// Third-party components indexed by package identity
    pub components: IndexMap<PackageId, BomComponent>,
    /// Dependency edges: bom-ref -> bom-refs it depends on
    pub dependencies: IndexMap<String, IndexSet<String>>,
}

impl Bom {
    /// Create an empty BOM for a spec version
    #[must_use]
    pub fn new(spec_version: SpecVersion) -> Self {
        Self {
            spec_version,
            version: 1,
            ..Self::default()
        }
    }

    /// Register a component unless one with the same package id exists.
    ///
    /// Returns `true` if the component was newly inserted. The first writer
    /// wins; later components with the same id are dropped.
    pub fn add_component(&mut self, id: PackageId, component: BomComponent) -> bool {
        if self.components.contains_key(&id) {
            return false;
        }
        self.dependencies
            .entry(component.bom_ref.clone())
            .or_default();
        self.components.insert(id, component);
        true
    }

    /// Get a component by package id
    #[must_use]
    pub fn get_component(&self, id: &PackageId) -> Option<&BomComponent> {
        self.components.get(id)
    }

    /// Add a `dependsOn` edge between two bom-refs.
    ///
    /// Self-edges are ignored. Returns `true` if the edge is new.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        self.dependencies
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string())
    }

    /// Bom-refs a component depends on
    #[must_use]
    pub fn dependencies_of(&self, bom_ref: &str) -> Vec<&str> {
        self.dependencies
            .get(bom_ref)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Set the root component and make sure it has a dependency entry
    pub fn set_root_component(&mut self, component: BomComponent) {
        self.dependencies
            .entry(component.bom_ref.clone())
            .or_default();
        self.metadata.component = Some(component);
    }

    /// The root component, if any
    #[must_use]
    pub fn root_component(&self) -> Option<&BomComponent> {
        self.metadata.component.as_ref()
    }

    /// Total number of dependency edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(IndexSet::len).sum()
    }

    /// Get total component count
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// Document-level metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BomMetadata {
    /// Generation timestamp
    pub timestamp: Option<DateTime<Utc>>,
    /// Lifecycle phases the BOM describes
    pub lifecycles: Vec<LifecyclePhase>,
    /// Tools in the build chain
    pub tools: Vec<Tool>,
    /// The application or library being bundled
    pub component: Option<BomComponent>,
    /// Supplier of the root component
    pub supplier: Option<Organization>,
    /// Free-form document properties
    pub properties: Vec<Property>,
}

/// Component in the BOM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomComponent {
    /// Unique reference inside the document (the purl when available)
    pub bom_ref: String,
    /// Component type
    pub component_type: ComponentType,
    /// npm scope, e.g. `@babel`
    pub group: Option<String>,
    /// Bare package name
    pub name: String,
    /// Version string
    pub version: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Author information
    pub author: Option<String>,
    /// Declared licenses
    pub licenses: Vec<License>,
    /// Package URL
    pub purl: Option<String>,
    /// External references
    pub external_refs: Vec<ExternalReference>,
    /// Licenses established from files on disk
    pub license_evidence: Vec<License>,
}

impl BomComponent {
    /// Create a new component with minimal required fields
    pub fn new(name: impl Into<String>, component_type: ComponentType) -> Self {
        let name = name.into();
        Self {
            bom_ref: name.clone(),
            component_type,
            group: None,
            name,
            version: None,
            description: None,
            author: None,
            licenses: Vec::new(),
            purl: None,
            external_refs: Vec::new(),
            license_evidence: Vec::new(),
        }
    }

    /// Full npm name, `group/name` for scoped packages
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.group {
            Some(group) => format!("{group}/{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Get display name with version
    #[must_use]
    pub fn display_name(&self) -> String {
        self.version.as_ref().map_or_else(
            || self.full_name(),
            |v| format!("{}@{}", self.full_name(), v),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str) -> BomComponent {
        let mut c = BomComponent::new(name, ComponentType::Library);
        c.bom_ref = format!("pkg:npm/{name}@1.0.0");
        c
    }

    #[test]
    fn test_first_writer_wins() {
        let mut bom = Bom::new(SpecVersion::V1_5);
        let id = PackageId::new("a", "1.0.0");

        let mut first = component("a");
        first.description = Some("first".to_string());
        let mut second = component("a");
        second.description = Some("second".to_string());

        assert!(bom.add_component(id.clone(), first));
        assert!(!bom.add_component(id.clone(), second));
        assert_eq!(bom.component_count(), 1);
        assert_eq!(
            bom.get_component(&id).unwrap().description.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_edges_are_a_set_without_self_loops() {
        let mut bom = Bom::new(SpecVersion::V1_5);
        assert!(bom.add_dependency("pkg:npm/a@1.0.0", "pkg:npm/b@1.0.0"));
        assert!(!bom.add_dependency("pkg:npm/a@1.0.0", "pkg:npm/b@1.0.0"));
        assert!(!bom.add_dependency("pkg:npm/a@1.0.0", "pkg:npm/a@1.0.0"));
        assert_eq!(bom.edge_count(), 1);
        assert_eq!(bom.dependencies_of("pkg:npm/a@1.0.0"), vec!["pkg:npm/b@1.0.0"]);
    }

    #[test]
    fn test_display_name_includes_scope() {
        let mut c = BomComponent::new("core", ComponentType::Library);
        c.group = Some("@babel".to_string());
        c.version = Some("7.0.0".to_string());
        assert_eq!(c.display_name(), "@babel/core@7.0.0");
    }
}
