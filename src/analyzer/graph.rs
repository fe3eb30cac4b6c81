//! The bundler's side of the contract: module graph and output bundle.

use crate::error::{ErrorContext, Result, SbomError};
use crate::model::ModuleId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the bundler knows about one parsed module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleInfo {
    pub id: ModuleId,
    /// Statically imported module ids, in source order
    pub imported_ids: Vec<ModuleId>,
    /// Module ids loaded through dynamic `import()`
    pub dynamically_imported_ids: Vec<ModuleId>,
}

impl ModuleInfo {
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_imports<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModuleId>,
    {
        self.imported_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_dynamic_imports<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModuleId>,
    {
        self.dynamically_imported_ids
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Static imports followed by dynamic imports
    pub fn all_imports(&self) -> impl Iterator<Item = &ModuleId> {
        self.imported_ids
            .iter()
            .chain(self.dynamically_imported_ids.iter())
    }
}

/// Read access to the bundler's module graph.
pub trait ModuleGraph: Send + Sync {
    fn module_info(&self, id: &ModuleId) -> Option<&ModuleInfo>;
}

/// In-memory [`ModuleGraph`] filled as modules are parsed.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: IndexMap<ModuleId, ModuleInfo>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a parsed module. A module parsed twice keeps the latest info.
    pub fn record(&mut self, info: ModuleInfo) {
        self.modules.insert(info.id.clone(), info);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.values()
    }
}

impl ModuleGraph for ModuleRegistry {
    fn module_info(&self, id: &ModuleId) -> Option<&ModuleInfo> {
        self.modules.get(id)
    }
}

impl FromIterator<ModuleInfo> for ModuleRegistry {
    fn from_iter<T: IntoIterator<Item = ModuleInfo>>(iter: T) -> Self {
        let mut registry = Self::new();
        for info in iter {
            registry.record(info);
        }
        registry
    }
}

/// One emitted output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputItem {
    /// Compiled code and the modules rendered into it
    #[serde(rename_all = "camelCase")]
    Chunk {
        #[serde(default)]
        module_ids: Vec<ModuleId>,
        #[serde(default)]
        dynamic_imports: Vec<ModuleId>,
    },
    /// Static file; never contributes modules
    Asset,
}

/// Emitted files keyed by output file name, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputBundle(IndexMap<String, OutputItem>);

impl OutputBundle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: impl Into<String>, item: OutputItem) {
        self.0.insert(file_name.into(), item);
    }

    /// Add a chunk with the given rendered modules
    #[must_use]
    pub fn with_chunk<I, S>(mut self, file_name: &str, module_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModuleId>,
    {
        self.insert(
            file_name,
            OutputItem::Chunk {
                module_ids: module_ids.into_iter().map(Into::into).collect(),
                dynamic_imports: Vec::new(),
            },
        );
        self
    }

    /// Add a static asset
    #[must_use]
    pub fn with_asset(mut self, file_name: &str) -> Self {
        self.insert(file_name, OutputItem::Asset);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputItem)> {
        self.0.iter().map(|(name, item)| (name.as_str(), item))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A finished build serialized to JSON, so any bundler can drive the CLI.
///
/// ```json
/// {
///   "modules": [{"id": "/app/src/main.js", "importedIds": ["/app/node_modules/a/index.js"]}],
///   "bundle": {"main.js": {"type": "chunk", "moduleIds": ["/app/src/main.js"]}}
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildSnapshot {
    pub modules: Vec<ModuleInfo>,
    pub bundle: OutputBundle,
}

impl BuildSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| SbomError::input(format!("malformed build snapshot: {e}")))
    }

    /// Load a snapshot file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SbomError::io(path, e))?;
        Self::from_json(&content)
            .with_context(|| format!("reading {}", path.display()))
    }

    /// Split into the module graph and the bundle
    #[must_use]
    pub fn into_parts(self) -> (ModuleRegistry, OutputBundle) {
        (self.modules.into_iter().collect(), self.bundle)
    }
}
