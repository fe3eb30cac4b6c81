//! Bounded-depth expansion of a bundle's third-party modules.

use super::graph::{ModuleGraph, OutputBundle, OutputItem};
use crate::model::{ModuleId, ModulePath};
use crate::resolve::is_external_module;
use futures::future::{join_all, BoxFuture, FutureExt};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, info};

/// Default number of import levels followed below a chunk's own modules.
pub const DEFAULT_RESOLVE_LIMIT: usize = 2;

/// A third-party module reached from the bundle, with the modules it imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalModuleRecord {
    pub module_id: ModuleId,
    pub parent_module_id: Option<ModuleId>,
    pub module_path: ModulePath,
    pub depends_on: Vec<ExternalModuleRecord>,
}

impl ExternalModuleRecord {
    /// This record and all its descendants, depth first
    pub fn iter(&self) -> impl Iterator<Item = &ExternalModuleRecord> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.depends_on.iter().rev());
            Some(next)
        })
    }

    /// Number of levels in this subtree, counting this record
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .depends_on
            .iter()
            .map(Self::depth)
            .max()
            .unwrap_or_default()
    }
}

/// Walks the module graph from the modules rendered into each chunk.
///
/// No visited-set is kept: the depth limit alone terminates the walk, so a
/// module reachable along several paths appears once per path and import
/// cycles are cut at the limit.
pub struct ExternalModuleAnalyzer<'g, G: ModuleGraph + ?Sized> {
    graph: &'g G,
    resolve_limit: usize,
}

impl<'g, G: ModuleGraph + ?Sized> ExternalModuleAnalyzer<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            resolve_limit: DEFAULT_RESOLVE_LIMIT,
        }
    }

    #[must_use]
    pub const fn with_resolve_limit(mut self, resolve_limit: usize) -> Self {
        self.resolve_limit = resolve_limit;
        self
    }

    /// Expand every chunk of the bundle.
    ///
    /// With a limit of `n`, records exist at depths `0..=n` below each chunk
    /// module.
    pub async fn analyze(&self, bundle: &OutputBundle) -> Vec<ExternalModuleRecord> {
        let mut records = Vec::new();

        for (file_name, item) in bundle.iter() {
            let OutputItem::Chunk {
                module_ids,
                dynamic_imports,
            } = item
            else {
                debug!("Skipping asset {file_name}");
                continue;
            };

            let roots: IndexSet<&ModuleId> = module_ids
                .iter()
                .chain(dynamic_imports.iter())
                .filter(|id| is_external_module(id))
                .collect();
            debug!("Chunk {file_name}: {} external modules", roots.len());

            let expanded =
                join_all(roots.into_iter().map(|id| self.expand(id, None, self.resolve_limit + 1)))
                    .await;
            records.extend(expanded.into_iter().flatten());
        }

        info!(
            "Found {} external module records",
            records.iter().map(|r| r.iter().count()).sum::<usize>()
        );
        records
    }

    fn expand<'a>(
        &'a self,
        id: &'a ModuleId,
        parent: Option<&'a ModuleId>,
        limit: usize,
    ) -> BoxFuture<'a, Option<ExternalModuleRecord>> {
        async move {
            if limit == 0 {
                return None;
            }

            let children: Vec<&ModuleId> = self
                .graph
                .module_info(id)
                .map(|info| info.all_imports().filter(|c| is_external_module(c)).collect())
                .unwrap_or_default();

            let depends_on = join_all(
                children
                    .into_iter()
                    .map(|child| self.expand(child, Some(id), limit - 1)),
            )
            .await
            .into_iter()
            .flatten()
            .collect();

            Some(ExternalModuleRecord {
                module_id: id.clone(),
                parent_module_id: parent.cloned(),
                module_path: id.module_path(),
                depends_on,
            })
        }
        .boxed()
    }
}

/// Analyze `bundle` against `graph` with the given resolve limit.
pub async fn analyze<G: ModuleGraph + ?Sized>(
    graph: &G,
    bundle: &OutputBundle,
    resolve_limit: usize,
) -> Vec<ExternalModuleRecord> {
    ExternalModuleAnalyzer::new(graph)
        .with_resolve_limit(resolve_limit)
        .analyze(bundle)
        .await
}
