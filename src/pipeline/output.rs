//! Emission of generated files.

use crate::error::{Result, SbomError};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Receives generated files, named relative to the bundle output.
#[async_trait]
pub trait AssetEmitter: Send + Sync {
    async fn emit_asset(&self, file_name: &str, source: &str) -> Result<()>;
}

/// Writes assets below a directory, creating parents as needed
#[derive(Debug, Clone)]
pub struct DirectoryEmitter {
    root: PathBuf,
}

impl DirectoryEmitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Target path of an asset; names may not leave the root
    pub fn target_path(&self, file_name: &str) -> Result<PathBuf> {
        let relative = Path::new(file_name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || file_name.is_empty() {
            return Err(SbomError::input(format!(
                "asset name '{file_name}' must be a relative path inside the output directory"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AssetEmitter for DirectoryEmitter {
    async fn emit_asset(&self, file_name: &str, source: &str) -> Result<()> {
        let path = self.target_path(file_name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SbomError::io(parent, e))?;
        }
        tokio::fs::write(&path, source)
            .await
            .map_err(|e| SbomError::io(&path, e))?;
        info!("Wrote {}", path.display());
        Ok(())
    }
}

/// Keeps emitted assets in memory, in emission order
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    assets: Mutex<IndexMap<String, String>>,
}

impl MemoryEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of an emitted asset
    pub fn get(&self, file_name: &str) -> Option<String> {
        self.lock().get(file_name).cloned()
    }

    /// Names of all emitted assets
    pub fn file_names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<String, String>> {
        self.assets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AssetEmitter for MemoryEmitter {
    async fn emit_asset(&self, file_name: &str, source: &str) -> Result<()> {
        self.lock().insert(file_name.to_string(), source.to_string());
        Ok(())
    }
}
