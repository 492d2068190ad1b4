//! # Command Layer
//!
//! This module contains the **core logic** of smsdb: the single collection
//! gateway every entity goes through. Each operation lives in its own
//! submodule as a plain function generic over the [`Record`] type and the
//! [`DocumentStore`] it runs against:
//!
//! ```ignore
//! commands::create::run::<_, UssdService>(&store, service)?;
//! commands::read::run::<_, UssdService>(&store, "*123*1#")?;
//! ```
//!
//! There is no per-entity code here. What differs between collections
//! (collection name, key field, unique fields, supported operations, field
//! rules) comes from the record's [`CollectionSpec`] and [`Record::validate`].
//!
//! ## Identity Reconciliation
//!
//! Records go into the store without a storage identifier and come back out
//! wrapped in [`Stored`], with the identifier the engine reported. Update never
//! trusts an identifier from the caller; it re-attaches the one belonging to
//! the document it replaced.
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O** beyond the store: no stdout, no HTTP, no exit codes
//! - **Payload decoding**: that is [`crate::mapping`]'s job
//! - **Retries**: a storage failure is returned as is
//!
//! ## Testing Strategy
//!
//! Command tests run against [`crate::store::MemBackend`] and cover every
//! branch, including an engine-level duplicate that slipped past the
//! existence check.

use crate::error::{Result, SmsdbError};
use crate::model::{CollectionSpec, Operation, Record, Stored};
use crate::store::{Document, DocumentStore, Filter, StoreError, StoredDocument};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub mod create;
pub mod delete;
pub mod read;
pub mod update;

/// Result of a successful delete. The removed record is not returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteConfirmation {
    pub entity: &'static str,
    pub key: String,
    pub message: String,
}

impl DeleteConfirmation {
    pub fn new(entity: &'static str, key: impl Into<String>) -> Self {
        Self {
            entity,
            key: key.into(),
            message: format!("{} deleted", entity),
        }
    }
}

/// Declare every index a collection needs. Idempotent.
pub fn ensure_indexes<S: DocumentStore + ?Sized>(store: &S, spec: &CollectionSpec) -> Result<()> {
    for index in spec.indexes() {
        store.ensure_index(spec.collection, &index)?;
    }
    Ok(())
}

pub(crate) fn ensure_supported<R: Record>(operation: Operation) -> Result<()> {
    if R::SPEC.supports(operation) {
        Ok(())
    } else {
        Err(SmsdbError::UnsupportedOperation {
            entity: R::SPEC.entity,
            operation,
        })
    }
}

pub(crate) fn key_filter<R: Record>(key: &str) -> Filter {
    Filter::eq(R::SPEC.key_field, key)
}

pub(crate) fn to_document<R: Record>(record: &R) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(document) => Ok(document),
        other => Err(SmsdbError::Storage(StoreError::Backend(format!(
            "{} did not serialize to an object: {}",
            R::SPEC.entity,
            other
        )))),
    }
}

pub(crate) fn from_document<R: Record>(stored: StoredDocument) -> Result<Stored<R>> {
    let record: R = serde_json::from_value(Value::Object(stored.body))?;
    Ok(Stored::new(stored.id, record))
}

/// An engine duplicate-key rejection is a conflict like any other.
pub(crate) fn translate_store_error<R: Record>(err: StoreError) -> SmsdbError {
    match err {
        StoreError::DuplicateKey { field, value, .. } => {
            warn!(
                entity = R::SPEC.entity,
                field = %field,
                value = %value,
                "unique index rejected a write that passed the existence check"
            );
            SmsdbError::Conflict {
                entity: R::SPEC.entity,
                field,
                value,
            }
        }
        other => SmsdbError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Otp, User};
    use crate::store::MemBackend;

    #[test]
    fn delete_confirmation_message() {
        let confirmation = DeleteConfirmation::new("USSD Service", "*123#");
        assert_eq!(confirmation.message, "USSD Service deleted");
        assert_eq!(confirmation.key, "*123#");
    }

    #[test]
    fn ensure_indexes_is_repeatable() {
        let store = MemBackend::new();
        ensure_indexes(&store, &User::SPEC).unwrap();
        ensure_indexes(&store, &User::SPEC).unwrap();
        ensure_indexes(&store, &Otp::SPEC).unwrap();
    }

    #[test]
    fn duplicate_key_becomes_conflict() {
        let err = translate_store_error::<User>(StoreError::DuplicateKey {
            collection: "user".into(),
            field: "email".into(),
            value: "a@x.io".into(),
        });
        assert_eq!(err.kind(), "conflict");
        assert_eq!(err.to_string(), "User with email 'a@x.io' already exists");
    }

    #[test]
    fn other_store_errors_stay_storage_errors() {
        let err = translate_store_error::<User>(StoreError::Backend("disk gone".into()));
        assert_eq!(err.kind(), "storage");
    }

    #[test]
    fn unsupported_operation_is_named() {
        let err = ensure_supported::<Otp>(Operation::Update).unwrap_err();
        assert_eq!(err.to_string(), "OTP does not support update");
        assert!(ensure_supported::<Otp>(Operation::Delete).is_ok());
    }

    #[test]
    fn key_filter_uses_key_field() {
        assert_eq!(key_filter::<Otp>("u-1"), Filter::eq("user_id", "u-1"));
    }
}
