use super::{display_value, Document, Filter, IndexSpec, StoreError, StoreResult};
use crate::model::StorageId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document together with its engine-assigned identifier.
///
/// On disk the identifier sits next to the body fields under `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "_id")]
    pub id: StorageId,
    #[serde(flatten)]
    pub body: Document,
}

/// The in-memory state of one collection, shared by both backends.
///
/// Every mutating method either applies fully or returns an error with the
/// collection untouched.
#[derive(Debug, Clone, Default)]
pub(crate) struct Collection {
    indexes: Vec<IndexSpec>,
    documents: Vec<StoredDocument>,
}

impl Collection {
    pub fn from_documents(documents: Vec<StoredDocument>) -> Self {
        Self {
            indexes: Vec::new(),
            documents,
        }
    }

    pub fn documents(&self) -> &[StoredDocument] {
        &self.documents
    }

    pub fn declare_index(&mut self, name: &str, index: &IndexSpec) -> StoreResult<()> {
        if self.indexes.contains(index) {
            return Ok(());
        }
        if index.unique {
            let mut seen: Vec<&Value> = Vec::new();
            for doc in &self.documents {
                if let Some(value) = indexed_value(&doc.body, &index.field) {
                    if seen.contains(&value) {
                        return Err(StoreError::Backend(format!(
                            "cannot build unique index on {}.{}: duplicate value {}",
                            name,
                            index.field,
                            display_value(value)
                        )));
                    }
                    seen.push(value);
                }
            }
        }
        self.indexes.retain(|existing| existing.field != index.field);
        self.indexes.push(index.clone());
        Ok(())
    }

    pub fn insert(&mut self, name: &str, body: Document) -> StoreResult<StorageId> {
        self.check_unique(name, &body, None)?;
        let id = StorageId::generate();
        self.documents.push(StoredDocument { id, body });
        Ok(id)
    }

    pub fn find(&self, filter: &Filter) -> Option<&StoredDocument> {
        self.documents.iter().find(|doc| filter.matches(&doc.body))
    }

    pub fn replace(
        &mut self,
        name: &str,
        filter: &Filter,
        body: Document,
    ) -> StoreResult<Option<StorageId>> {
        let Some(position) = self.position(filter) else {
            return Ok(None);
        };
        let id = self.documents[position].id;
        self.check_unique(name, &body, Some(id))?;
        self.documents[position].body = body;
        Ok(Some(id))
    }

    pub fn delete(&mut self, filter: &Filter) -> bool {
        match self.position(filter) {
            Some(position) => {
                self.documents.remove(position);
                true
            }
            None => false,
        }
    }

    fn position(&self, filter: &Filter) -> Option<usize> {
        self.documents
            .iter()
            .position(|doc| filter.matches(&doc.body))
    }

    /// Fails if `body` would duplicate a uniquely indexed value held by any
    /// document other than `skip`.
    fn check_unique(&self, name: &str, body: &Document, skip: Option<StorageId>) -> StoreResult<()> {
        for index in self.indexes.iter().filter(|index| index.unique) {
            let Some(value) = indexed_value(body, &index.field) else {
                continue;
            };
            let taken = self.documents.iter().any(|doc| {
                Some(doc.id) != skip && indexed_value(&doc.body, &index.field) == Some(value)
            });
            if taken {
                return Err(StoreError::DuplicateKey {
                    collection: name.to_string(),
                    field: index.field.clone(),
                    value: display_value(value),
                });
            }
        }
        Ok(())
    }
}

fn indexed_value<'a>(body: &'a Document, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn keyed() -> Collection {
        let mut c = Collection::default();
        c.declare_index("user", &IndexSpec::unique("id")).unwrap();
        c.declare_index("user", &IndexSpec::unique("email")).unwrap();
        c
    }

    #[test]
    fn insert_assigns_distinct_ids() {
        let mut c = Collection::default();
        let a = c.insert("otp", doc(json!({"user_id": "u-1"}))).unwrap();
        let b = c.insert("otp", doc(json!({"user_id": "u-1"}))).unwrap();
        assert_ne!(a, b);
        assert_eq!(c.documents().len(), 2);
    }

    #[test]
    fn unique_index_rejects_duplicates() {
        let mut c = keyed();
        c.insert("user", doc(json!({"id": "u-1", "email": "a@x.io"})))
            .unwrap();

        let err = c
            .insert("user", doc(json!({"id": "u-2", "email": "a@x.io"})))
            .unwrap_err();
        match err {
            StoreError::DuplicateKey { field, value, .. } => {
                assert_eq!(field, "email");
                assert_eq!(value, "a@x.io");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(c.documents().len(), 1);
    }

    #[test]
    fn missing_or_null_values_are_not_indexed() {
        let mut c = keyed();
        c.insert("user", doc(json!({"id": "u-1"}))).unwrap();
        c.insert("user", doc(json!({"id": "u-2", "email": null})))
            .unwrap();
        c.insert("user", doc(json!({"id": "u-3"}))).unwrap();
        assert_eq!(c.documents().len(), 3);
    }

    #[test]
    fn find_returns_earliest_match() {
        let mut c = Collection::default();
        let first = c
            .insert("otp", doc(json!({"user_id": "u-1", "cd": "111111"})))
            .unwrap();
        c.insert("otp", doc(json!({"user_id": "u-1", "cd": "222222"})))
            .unwrap();

        let found = c.find(&Filter::eq("user_id", "u-1")).unwrap();
        assert_eq!(found.id, first);
        assert_eq!(found.body["cd"], "111111");
    }

    #[test]
    fn replace_keeps_id_and_may_keep_own_unique_value() {
        let mut c = keyed();
        let id = c
            .insert("user", doc(json!({"id": "u-1", "email": "a@x.io", "nm": "A"})))
            .unwrap();

        let replaced = c
            .replace(
                "user",
                &Filter::eq("id", "u-1"),
                doc(json!({"id": "u-1", "email": "a@x.io", "nm": "B"})),
            )
            .unwrap();
        assert_eq!(replaced, Some(id));
        assert_eq!(c.documents()[0].body["nm"], "B");
    }

    #[test]
    fn replace_cannot_take_another_documents_unique_value() {
        let mut c = keyed();
        c.insert("user", doc(json!({"id": "u-1", "email": "a@x.io"})))
            .unwrap();
        c.insert("user", doc(json!({"id": "u-2", "email": "b@x.io"})))
            .unwrap();

        let err = c
            .replace(
                "user",
                &Filter::eq("id", "u-2"),
                doc(json!({"id": "u-2", "email": "a@x.io"})),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(c.documents()[1].body["email"], "b@x.io");
    }

    #[test]
    fn replace_without_match_is_none() {
        let mut c = keyed();
        let result = c
            .replace("user", &Filter::eq("id", "ghost"), doc(json!({"id": "ghost"})))
            .unwrap();
        assert_eq!(result, None);
        assert!(c.documents().is_empty());
    }

    #[test]
    fn delete_removes_only_first_match() {
        let mut c = Collection::default();
        c.insert("otp", doc(json!({"user_id": "u-1", "cd": "111111"})))
            .unwrap();
        c.insert("otp", doc(json!({"user_id": "u-1", "cd": "222222"})))
            .unwrap();

        assert!(c.delete(&Filter::eq("user_id", "u-1")));
        assert_eq!(c.documents().len(), 1);
        assert_eq!(c.documents()[0].body["cd"], "222222");
        assert!(!c.delete(&Filter::eq("user_id", "u-9")));
    }

    #[test]
    fn unique_index_over_violating_data_is_refused() {
        let mut c = Collection::default();
        c.insert("shortcode", doc(json!({"cd": "20222"}))).unwrap();
        c.insert("shortcode", doc(json!({"cd": "20222"}))).unwrap();

        let err = c
            .declare_index("shortcode", &IndexSpec::unique("cd"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));

        // Not declared, so duplicates are still accepted.
        c.insert("shortcode", doc(json!({"cd": "20222"}))).unwrap();
    }

    #[test]
    fn declare_index_is_idempotent() {
        let mut c = keyed();
        c.declare_index("user", &IndexSpec::unique("id")).unwrap();
        c.insert("user", doc(json!({"id": "u-1"}))).unwrap();
        assert!(c.insert("user", doc(json!({"id": "u-1"}))).is_err());
    }

    #[test]
    fn stored_document_serializes_id_beside_body() {
        let stored = StoredDocument {
            id: StorageId::generate(),
            body: doc(json!({"cd": "20222"})),
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["cd"], "20222");
        assert!(value["_id"].is_string());

        let back: StoredDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, stored);
    }
}
