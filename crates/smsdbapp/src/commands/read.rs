use super::{ensure_supported, from_document, key_filter};
use crate::error::{Result, SmsdbError};
use crate::model::{Operation, Record, Stored};
use crate::store::DocumentStore;
use tracing::debug;

/// Fetch a record by application key, with its storage identifier attached.
pub fn run<S: DocumentStore + ?Sized, R: Record>(store: &S, key: &str) -> Result<Stored<R>> {
    let spec = R::SPEC;
    ensure_supported::<R>(Operation::Read)?;
    debug!(entity = spec.entity, key, "reading record");

    match store.find_one(spec.collection, &key_filter::<R>(key))? {
        Some(found) => from_document(found),
        None => Err(SmsdbError::NotFound {
            entity: spec.entity,
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::model::{Analytics, Campaign, Otp, Payment};
    use crate::test_utils::*;

    #[test]
    fn missing_key_is_not_found() {
        let store = indexed_mem_store();
        let err = run::<_, Campaign>(&store, "nope").unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.to_string(), "Campaign not found: nope");
    }

    #[test]
    fn returns_input_plus_storage_id() {
        let store = indexed_mem_store();
        let created = create::run(&store, sample_campaign("cmp-1")).unwrap();
        let fetched = run::<_, Campaign>(&store, "cmp-1").unwrap();

        assert_eq!(fetched.record, sample_campaign("cmp-1"));
        assert_eq!(fetched.storage_id, created.storage_id);
        assert!(!fetched.storage_id.to_string().is_empty());
    }

    #[test]
    fn transient_read_returns_earliest() {
        let store = indexed_mem_store();
        let first = create::run(&store, sample_otp("u-1", "111111")).unwrap();
        create::run(&store, sample_otp("u-1", "222222")).unwrap();

        let fetched = run::<_, Otp>(&store, "u-1").unwrap();
        assert_eq!(fetched.storage_id, first.storage_id);
        assert_eq!(fetched.record.cd, "111111");
    }

    #[test]
    fn analytics_metrics_come_back_intact() {
        let store = indexed_mem_store();
        create::run(&store, sample_analytics("cmp-9")).unwrap();
        let fetched = run::<_, Analytics>(&store, "cmp-9").unwrap();
        assert_eq!(fetched.record.metrics["clicked"], 87);
    }

    #[test]
    fn create_only_entities_cannot_be_read() {
        let store = indexed_mem_store();
        create::run(&store, sample_payment("pay-1", 5.0, "USD")).unwrap();
        let err = run::<_, Payment>(&store, "pay-1").unwrap_err();
        assert!(matches!(err, SmsdbError::UnsupportedOperation { .. }));
    }
}
