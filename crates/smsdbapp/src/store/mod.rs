//! # Storage Layer
//!
//! This module defines the document storage abstraction behind every
//! collection. The [`DocumentStore`] trait is deliberately small: it knows
//! nothing about records, validation or application keys. It stores JSON
//! documents per named collection, assigns a [`StorageId`] on insert and
//! enforces unique indexes.
//!
//! ```text
//!   commands (create/read/update/delete)
//!        │   Record  ⇄  Document
//!        ▼
//!   DocumentStore  ── ensure_index / insert_one / find_one / replace_one / delete_one
//!        │
//!        ├── MemBackend   (process memory, tests and `--backend memory`)
//!        └── FsBackend    (one JSON file per collection)
//! ```
//!
//! ## Unique Indexes
//!
//! Uniqueness is the engine's job, not the caller's. Callers check for an
//! existing record before inserting so they can report a friendly conflict,
//! but two concurrent creates can both pass that check. The engine closes the
//! race: an insert or replace that would duplicate a uniquely indexed value
//! fails with [`StoreError::DuplicateKey`] and leaves the collection unchanged.
//!
//! Documents that lack a uniquely indexed field (or hold `null` there) are not
//! indexed for it.
//!
//! ## Ordering
//!
//! Collections keep insertion order. When a filter matches several documents
//! (only possible on non-unique lookups), the earliest inserted one wins.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── campaign.json        # [{"_id": "…", "id": "cmp-1", …}, …]
//! ├── ussd_service.json
//! └── …
//! ```

use crate::model::StorageId;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

mod collection;
pub mod fs_backend;
pub mod mem_backend;

pub use collection::StoredDocument;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;

/// A schemaless JSON object as held by the engine.
pub type Document = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate value for unique index {collection}.{field}: {value}")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
    },

    #[error("{0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Equality match on a single top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}

/// An index the engine maintains over one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: String,
    pub unique: bool,
}

impl IndexSpec {
    pub fn unique(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            unique: true,
        }
    }

    /// Non-unique index, used for lookups only.
    pub fn lookup(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            unique: false,
        }
    }
}

/// Abstract interface for document storage.
///
/// All methods take `&self`; implementations synchronize internally so a
/// single store can be shared across request handlers.
pub trait DocumentStore: Send + Sync {
    /// Declare an index. Idempotent. Declaring a unique index over data that
    /// already violates it fails and leaves the index undeclared.
    fn ensure_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<()>;

    /// Insert a document and return its newly assigned identifier.
    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<StorageId>;

    /// Earliest inserted document matching the filter.
    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<StoredDocument>>;

    /// Replace the body of the first matching document, keeping its
    /// identifier. Returns `None` when nothing matched.
    fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> StoreResult<Option<StorageId>>;

    /// Remove the first matching document. Returns whether one was removed.
    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<bool>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Box<T> {
    fn ensure_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<()> {
        (**self).ensure_index(collection, index)
    }

    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<StorageId> {
        (**self).insert_one(collection, document)
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<StoredDocument>> {
        (**self).find_one(collection, filter)
    }

    fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> StoreResult<Option<StorageId>> {
        (**self).replace_one(collection, filter, document)
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<bool> {
        (**self).delete_one(collection, filter)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn ensure_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<()> {
        (**self).ensure_index(collection, index)
    }

    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<StorageId> {
        (**self).insert_one(collection, document)
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<StoredDocument>> {
        (**self).find_one(collection, filter)
    }

    fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> StoreResult<Option<StorageId>> {
        (**self).replace_one(collection, filter, document)
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<bool> {
        (**self).delete_one(collection, filter)
    }
}

/// Which storage engine to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Fs,
    Memory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Fs => "fs",
            BackendKind::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fs" | "file" | "files" => Ok(BackendKind::Fs),
            "memory" | "mem" => Ok(BackendKind::Memory),
            other => Err(format!(
                "unknown storage backend '{}' (expected 'fs' or 'memory')",
                other
            )),
        }
    }
}

/// Open a storage engine. `data_dir` is only used by the filesystem backend.
pub fn open(kind: BackendKind, data_dir: &Path) -> StoreResult<Box<dyn DocumentStore>> {
    match kind {
        BackendKind::Fs => Ok(Box::new(FsBackend::open(data_dir)?)),
        BackendKind::Memory => Ok(Box::new(MemBackend::new())),
    }
}

/// Render an indexed value for error messages: strings bare, everything else as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_matches_exact_value() {
        let doc = json!({"cd": "*123#", "session_timeout": 60});
        let doc = doc.as_object().unwrap();

        assert!(Filter::eq("cd", "*123#").matches(doc));
        assert!(!Filter::eq("cd", "*123*1#").matches(doc));
        assert!(!Filter::eq("missing", "*123#").matches(doc));
        assert!(Filter::eq("session_timeout", 60).matches(doc));
        assert!(!Filter::eq("session_timeout", "60").matches(doc));
    }

    #[test]
    fn backend_kind_parsing() {
        assert_eq!("fs".parse::<BackendKind>().unwrap(), BackendKind::Fs);
        assert_eq!(" Memory ".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert!("mongo".parse::<BackendKind>().is_err());
    }

    #[test]
    fn open_memory_backend_needs_no_directory() {
        let store = open(BackendKind::Memory, Path::new("/nonexistent/smsdb")).unwrap();
        let id = store
            .insert_one("campaign", json!({"id": "cmp-1"}).as_object().unwrap().clone())
            .unwrap();
        let found = store
            .find_one("campaign", &Filter::eq("id", "cmp-1"))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
    }

    #[test]
    fn boxed_and_shared_stores_delegate() {
        let shared: Arc<dyn DocumentStore> = Arc::new(MemBackend::new());
        let boxed: Box<Arc<dyn DocumentStore>> = Box::new(shared.clone());
        boxed
            .insert_one("otp", json!({"user_id": "u-1"}).as_object().unwrap().clone())
            .unwrap();
        assert!(shared
            .find_one("otp", &Filter::eq("user_id", "u-1"))
            .unwrap()
            .is_some());
    }
}
