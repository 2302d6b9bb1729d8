use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A secondary index registered with the catalog.
///
/// `expressions` holds the string forms of the column expressions the index
/// covers, in index order. A single-column index has one entry; a composite
/// index has one entry per covered column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub database: String,
    pub table: String,
    pub expressions: Vec<String>,
}

impl Index {
    pub fn new(
        name: impl Into<String>,
        database: impl Into<String>,
        table: impl Into<String>,
        expressions: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
            table: table.into(),
            expressions,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.expressions.len() > 1
    }
}

#[derive(Default)]
struct CatalogState {
    indexes: Vec<Arc<Index>>,
    references: FxHashMap<String, usize>,
}

/// Process-wide index registry.
///
/// Lookups return a consistent snapshot of the registered indexes and bump
/// the index's live reference count; callers release handles they do not
/// consume. Handles stay valid for the acquiring compilation even if the
/// index is dropped concurrently (best effort, may stop matching new plans).
pub struct IndexCatalog {
    current_database: String,
    state: RwLock<CatalogState>,
}

impl IndexCatalog {
    pub fn new(current_database: impl Into<String>) -> Self {
        Self {
            current_database: current_database.into(),
            state: RwLock::new(CatalogState::default()),
        }
    }

    pub fn current_database(&self) -> &str {
        &self.current_database
    }

    pub fn register_index(&self, index: Index) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        debug!(index = %index.name, table = %index.table, "registering index");
        state.references.entry(index.name.clone()).or_insert(0);
        state.indexes.push(Arc::new(index));
    }

    /// Finds an index covering exactly the given ordered expression list.
    ///
    /// A match acquires the index: the live reference count is incremented
    /// and the caller owns the handle until it either transfers it into a
    /// compiled plan or releases it with [`release_index`].
    ///
    /// [`release_index`]: IndexCatalog::release_index
    pub fn index_by_expressions(
        &self,
        database: &str,
        expressions: &[String],
    ) -> Option<Arc<Index>> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let found = state
            .indexes
            .iter()
            .find(|idx| idx.database == database && idx.expressions == expressions)
            .cloned();
        if let Some(idx) = &found {
            debug!(index = %idx.name, "acquired index");
            *state.references.entry(idx.name.clone()).or_insert(0) += 1;
        }
        found
    }

    /// Releases a previously acquired index handle.
    ///
    /// Releasing an index with no live references is a no-op.
    pub fn release_index(&self, index: &Index) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match state.references.get_mut(&index.name) {
            Some(count) if *count > 0 => {
                *count -= 1;
                debug!(index = %index.name, remaining = *count, "released index");
            }
            _ => {
                debug!(index = %index.name, "release of index with no live references");
            }
        }
    }

    /// Number of live references to the named index.
    pub fn reference_count(&self, name: &str) -> usize {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.references.get(name).copied().unwrap_or(0)
    }
}
