//! Table Cache Module
//! Keeps loaded tables keyed by file path and row cap.

use super::loader::{DataLoader, LoaderError};
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Identity of a cached table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub row_cap: Option<usize>,
}

impl CacheKey {
    pub fn new(path: impl Into<PathBuf>, row_cap: Option<usize>) -> Self {
        Self {
            path: path.into(),
            row_cap,
        }
    }
}

/// Read-only tables shared between the shell and background loaders.
///
/// Tables are handed out as `Arc<DataFrame>` and never modified in place;
/// reloading a file requires an explicit `invalidate`.
#[derive(Default)]
pub struct TableCache {
    entries: RwLock<HashMap<CacheKey, Arc<DataFrame>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached table for the key, if any.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<DataFrame>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Return the cached table or load it from disk.
    pub fn get_or_load(
        &self,
        path: &Path,
        row_cap: Option<usize>,
    ) -> Result<Arc<DataFrame>, LoaderError> {
        let key = CacheKey::new(path, row_cap);
        if let Some(table) = self.get(&key) {
            log::debug!("Table cache hit for {}", path.display());
            return Ok(table);
        }

        let table = Arc::new(DataLoader::load_csv(path, row_cap)?);

        // Another loader may have raced us; keep whichever landed first.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(key).or_insert(table).clone())
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&self, path: &Path, row_cap: Option<usize>) -> bool {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&CacheKey::new(path, row_cap))
            .is_some();
        if removed {
            log::info!("Invalidated cached table {}", path.display());
        }
        removed
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
