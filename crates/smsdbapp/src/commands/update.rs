use super::{ensure_supported, key_filter, to_document, translate_store_error};
use crate::error::{Result, SmsdbError};
use crate::model::{Operation, Record, Stored};
use crate::store::DocumentStore;
use crate::validation::Validator;
use tracing::info;

/// Replace the whole record stored under `key`.
///
/// Keys are immutable, so the record must carry the same key it is stored
/// under. Fields left out of `record` are gone after the update. The storage
/// identifier returned is the one of the replaced document.
pub fn run<S: DocumentStore + ?Sized, R: Record>(
    store: &S,
    key: &str,
    mut record: R,
) -> Result<Stored<R>> {
    let spec = R::SPEC;
    ensure_supported::<R>(Operation::Update)?;
    record.normalize();

    let mut v = Validator::new();
    record.validate(&mut v);
    if record.key() != key {
        v.violation(
            spec.key_field,
            format!("must match the key being updated ('{}')", key),
        );
    }
    v.finish().map_err(SmsdbError::Validation)?;

    let document = to_document(&record)?;
    let replaced = store
        .replace_one(spec.collection, &key_filter::<R>(key), document)
        .map_err(translate_store_error::<R>)?;

    match replaced {
        Some(storage_id) => {
            info!(entity = spec.entity, key, %storage_id, "record updated");
            Ok(Stored::new(storage_id, record))
        }
        None => Err(SmsdbError::NotFound {
            entity: spec.entity,
            key: key.to_string(),
        }),
    }
}
