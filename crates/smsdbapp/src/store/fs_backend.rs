use super::collection::{Collection, StoredDocument};
use super::{Document, DocumentStore, Filter, IndexSpec, StoreError, StoreResult};
use crate::model::StorageId;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Filesystem storage backend: one pretty-printed JSON array per collection.
///
/// Collections are loaded lazily on first touch and cached. Index
/// declarations live in memory only and are re-declared on every start.
/// Writes go to a temporary file that is renamed over the target, so a
/// crash never leaves a half-written collection behind.
pub struct FsBackend {
    root: PathBuf,
    collections: Mutex<HashMap<String, Collection>>,
}

impl FsBackend {
    pub fn open(root: &Path) -> StoreResult<Self> {
        if !root.exists() {
            fs::create_dir_all(root)?;
        }
        if !root.is_dir() {
            return Err(StoreError::Backend(format!(
                "data directory {} is not a directory",
                root.display()
            )));
        }
        debug!(root = %root.display(), "opened filesystem store");
        Ok(Self {
            root: root.to_path_buf(),
            collections: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.json", collection))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Backend("filesystem store lock poisoned".to_string()))
    }

    fn load(&self, collection: &str) -> StoreResult<Collection> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Collection::default());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Collection::default());
        }
        let documents: Vec<StoredDocument> = serde_json::from_str(&content)?;
        debug!(collection, count = documents.len(), "loaded collection");
        Ok(Collection::from_documents(documents))
    }

    fn persist(&self, collection: &str, state: &Collection) -> StoreResult<()> {
        let target = self.collection_path(collection);
        let content = serde_json::to_string_pretty(state.documents())?;

        let tmp = self
            .root
            .join(format!(".{}-{}.tmp", collection, Uuid::new_v4()));
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Run `op` against a copy of the collection, persist the copy, and only
    /// then make it the cached state.
    fn mutate<T>(
        &self,
        collection: &str,
        op: impl FnOnce(&mut Collection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut collections = self.lock()?;
        if !collections.contains_key(collection) {
            let loaded = self.load(collection)?;
            collections.insert(collection.to_string(), loaded);
        }
        let Some(current) = collections.get_mut(collection) else {
            return Err(StoreError::Backend(format!(
                "collection {} vanished while locked",
                collection
            )));
        };

        let mut next = current.clone();
        let out = op(&mut next)?;
        self.persist(collection, &next)?;
        *current = next;
        Ok(out)
    }

    fn read<T>(&self, collection: &str, op: impl FnOnce(&Collection) -> T) -> StoreResult<T> {
        let mut collections = self.lock()?;
        if !collections.contains_key(collection) {
            let loaded = self.load(collection)?;
            collections.insert(collection.to_string(), loaded);
        }
        match collections.get(collection) {
            Some(c) => Ok(op(c)),
            None => Ok(op(&Collection::default())),
        }
    }
}

impl DocumentStore for FsBackend {
    fn ensure_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<()> {
        let mut collections = self.lock()?;
        if !collections.contains_key(collection) {
            let loaded = self.load(collection)?;
            collections.insert(collection.to_string(), loaded);
        }
        match collections.get_mut(collection) {
            Some(c) => c.declare_index(collection, index),
            None => Ok(()),
        }
    }

    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<StorageId> {
        self.mutate(collection, |c| c.insert(collection, document))
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<StoredDocument>> {
        self.read(collection, |c| c.find(filter).cloned())
    }

    fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> StoreResult<Option<StorageId>> {
        // A miss writes nothing.
        if self.find_one(collection, filter)?.is_none() {
            return Ok(None);
        }
        self.mutate(collection, |c| c.replace(collection, filter, document))
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<bool> {
        if self.find_one(collection, filter)?.is_none() {
            return Ok(false);
        }
        self.mutate(collection, |c| Ok(c.delete(filter)))
    }
}
