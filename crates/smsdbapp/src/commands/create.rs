use super::{ensure_supported, to_document, translate_store_error};
use crate::error::{Result, SmsdbError};
use crate::model::{Operation, Record, Stored};
use crate::store::{DocumentStore, Filter};
use tracing::{debug, info};

/// Validate and insert a new record.
///
/// Every uniquely indexed field is checked for an existing holder first so
/// the common conflict is reported without a failed write. The engine's
/// unique index still has the final say.
pub fn run<S: DocumentStore + ?Sized, R: Record>(store: &S, mut record: R) -> Result<Stored<R>> {
    let spec = R::SPEC;
    ensure_supported::<R>(Operation::Create)?;
    record.normalize();
    record.check().map_err(SmsdbError::Validation)?;

    for field in spec.unique_fields {
        let Some(value) = record.unique_value(field) else {
            continue;
        };
        if store
            .find_one(spec.collection, &Filter::eq(*field, value))?
            .is_some()
        {
            debug!(entity = spec.entity, field, value, "create refused, value taken");
            return Err(SmsdbError::Conflict {
                entity: spec.entity,
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    }

    let document = to_document(&record)?;
    let storage_id = store
        .insert_one(spec.collection, document)
        .map_err(translate_store_error::<R>)?;

    info!(entity = spec.entity, key = record.key(), %storage_id, "record created");
    Ok(Stored::new(storage_id, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::read;
    use crate::model::{StorageId, UssdService};
    use crate::store::{Document, IndexSpec, MemBackend, StoreResult, StoredDocument};
    use crate::test_utils::*;

    #[test]
    fn creates_and_attaches_storage_id() {
        let store = indexed_mem_store();
        let stored = run(&store, sample_ussd_service("*123*1#")).unwrap();

        assert_eq!(stored.record.cd, "*123*1#");
        let fetched = read::run::<_, UssdService>(&store, "*123*1#").unwrap();
        assert_eq!(fetched.storage_id, stored.storage_id);
        assert_eq!(fetched.record, stored.record);
    }

    #[test]
    fn duplicate_key_conflicts_and_keeps_original() {
        let store = indexed_mem_store();
        run(&store, sample_ussd_service("*123*1#")).unwrap();

        let mut second = sample_ussd_service("*123*1#");
        second.ds = "Imposter".into();
        let err = run(&store, second).unwrap_err();
        assert!(matches!(err, SmsdbError::Conflict { .. }));
        assert_eq!(err.to_string(), "USSD Service with cd '*123*1#' already exists");

        let kept = read::run::<_, UssdService>(&store, "*123*1#").unwrap();
        assert_eq!(kept.record.ds, "Balance check");
        assert_eq!(store.count("ussd_service").unwrap(), 1);
    }

    #[test]
    fn user_email_must_be_unique() {
        let store = indexed_mem_store();
        run(&store, sample_user("u-1", "jane@example.com")).unwrap();

        let err = run(&store, sample_user("u-2", "jane@example.com")).unwrap_err();
        match err {
            SmsdbError::Conflict { field, .. } => assert_eq!(field, "email"),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(store.count("user").unwrap(), 1);
    }

    #[test]
    fn email_domain_case_does_not_dodge_uniqueness() {
        let store = indexed_mem_store();
        let stored = run(&store, sample_user("u-1", "jane@Example.COM")).unwrap();
        assert_eq!(stored.record.email, "jane@example.com");

        let err = run(&store, sample_user("u-2", "jane@example.com")).unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert_eq!(store.count("user").unwrap(), 1);
    }

    #[test]
    fn invalid_record_writes_nothing() {
        let store = indexed_mem_store();
        let err = run(&store, sample_otp("u-1", "12345")).unwrap_err();
        assert_eq!(err.violations().unwrap().fields(), vec!["cd"]);
        assert_eq!(store.count("otp").unwrap(), 0);

        run(&store, sample_otp("u-1", "123456")).unwrap();
        assert_eq!(store.count("otp").unwrap(), 1);
    }

    #[test]
    fn payment_amount_must_be_positive() {
        let store = indexed_mem_store();
        assert!(matches!(
            run(&store, sample_payment("pay-1", -5.0, "USD")),
            Err(SmsdbError::Validation(_))
        ));
        let stored = run(&store, sample_payment("pay-1", 5.0, "USD")).unwrap();
        assert_eq!(stored.record.amount, 5.0);
    }

    #[test]
    fn transient_collections_accept_repeated_keys() {
        let store = indexed_mem_store();
        let a = run(&store, sample_otp("u-1", "111111")).unwrap();
        let b = run(&store, sample_otp("u-1", "222222")).unwrap();
        assert_ne!(a.storage_id, b.storage_id);

        run(&store, sample_analytics("cmp-1")).unwrap();
        run(&store, sample_analytics("cmp-1")).unwrap();
        assert_eq!(store.count("analytic").unwrap(), 2);
    }

    #[test]
    fn storage_failure_propagates() {
        let store = indexed_mem_store();
        store.set_simulate_write_error(true);
        let err = run(&store, sample_campaign("cmp-1")).unwrap_err();
        assert_eq!(err.kind(), "storage");
    }

    /// Store whose lookups never see anything, as if a concurrent create
    /// landed between the existence check and the insert.
    struct LaggingStore(MemBackend);

    impl DocumentStore for LaggingStore {
        fn ensure_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<()> {
            self.0.ensure_index(collection, index)
        }

        fn insert_one(&self, collection: &str, document: Document) -> StoreResult<StorageId> {
            self.0.insert_one(collection, document)
        }

        fn find_one(&self, _: &str, _: &Filter) -> StoreResult<Option<StoredDocument>> {
            Ok(None)
        }

        fn replace_one(
            &self,
            collection: &str,
            filter: &Filter,
            document: Document,
        ) -> StoreResult<Option<StorageId>> {
            self.0.replace_one(collection, filter, document)
        }

        fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<bool> {
            self.0.delete_one(collection, filter)
        }
    }

    #[test]
    fn index_rejection_after_passed_check_is_a_conflict() {
        let store = LaggingStore(indexed_mem_store());
        run(&store, sample_user("u-1", "jane@example.com")).unwrap();

        let err = run(&store, sample_user("u-1", "other@example.com")).unwrap_err();
        match err {
            SmsdbError::Conflict { entity, field, value } => {
                assert_eq!(entity, "User");
                assert_eq!(field, "id");
                assert_eq!(value, "u-1");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(store.0.count("user").unwrap(), 1);
    }

    #[test]
    fn create_only_entities_are_creatable() {
        let store = indexed_mem_store();
        run(&store, sample_scheduler("sch-1")).unwrap();
        run(&store, sample_service("svc-1")).unwrap();
        run(&store, sample_ticket("t-1")).unwrap();
        run(&store, sample_profile("p-1")).unwrap();
        run(&store, sample_permission("perm-1")).unwrap();
        run(&store, sample_order("ord-1")).unwrap();
        run(&store, sample_support("s-1")).unwrap();
        assert!(run(&store, sample_support("s-1")).is_err());
    }
}
