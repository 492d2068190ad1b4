use super::{ensure_supported, key_filter, DeleteConfirmation};
use crate::error::{Result, SmsdbError};
use crate::model::{Operation, Record};
use crate::store::DocumentStore;
use tracing::info;

/// Remove the record stored under `key`. For transient collections this is
/// the earliest inserted match.
pub fn run<S: DocumentStore + ?Sized, R: Record>(
    store: &S,
    key: &str,
) -> Result<DeleteConfirmation> {
    let spec = R::SPEC;
    ensure_supported::<R>(Operation::Delete)?;

    if store.delete_one(spec.collection, &key_filter::<R>(key))? {
        info!(entity = spec.entity, key, "record deleted");
        Ok(DeleteConfirmation::new(spec.entity, key))
    } else {
        Err(SmsdbError::NotFound {
            entity: spec.entity,
            key: key.to_string(),
        })
    }
}
