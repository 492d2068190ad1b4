use super::collection::{Collection, StoredDocument};
use super::{Document, DocumentStore, Filter, IndexSpec, StoreError, StoreResult};
use crate::model::StorageId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// In-memory storage backend.
///
/// Backs the test suite and `--backend memory`. A single mutex guards all
/// collections, so every operation is atomic with respect to the others.
#[derive(Default)]
pub struct MemBackend {
    collections: Mutex<HashMap<String, Collection>>,
    simulate_write_error: AtomicBool,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Number of documents currently held in a collection.
    pub fn count(&self, collection: &str) -> StoreResult<usize> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|c| c.documents().len())
            .unwrap_or(0))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl DocumentStore for MemBackend {
    fn ensure_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<()> {
        let mut collections = self.lock()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .declare_index(collection, index)
    }

    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<StorageId> {
        self.check_writable()?;
        let mut collections = self.lock()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(collection, document)
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<StoredDocument>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|c| c.find(filter))
            .cloned())
    }

    fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> StoreResult<Option<StorageId>> {
        self.check_writable()?;
        let mut collections = self.lock()?;
        match collections.get_mut(collection) {
            Some(c) => c.replace(collection, filter, document),
            None => Ok(None),
        }
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<bool> {
        self.check_writable()?;
        let mut collections = self.lock()?;
        Ok(collections
            .get_mut(collection)
            .map(|c| c.delete(filter))
            .unwrap_or(false))
    }
}
