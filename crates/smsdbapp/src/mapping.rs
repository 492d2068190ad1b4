//! Translation between external JSON payloads and typed records.
//!
//! Decoding never lets a malformed payload past the boundary, and never stops
//! at the first problem. When a payload does not decode, each field is tried
//! on its own against a placeholder record ([`Record`] types are `Default`),
//! so every missing or mistyped field is reported under its own name. The
//! field rules then run over the fields that did decode, and all of it comes
//! back as one [`SmsdbError::Validation`]. A `storage_id` in the payload is
//! ignored.

use crate::error::{Result, SmsdbError};
use crate::model::{Record, Stored};
use crate::validation::{ValidationErrors, Validator, Violation};
use serde_json::{Map, Value};

/// Field name used when a decode error cannot be pinned to one field.
pub const BODY_FIELD: &str = "body";

const FIELD_REQUIRED: &str = "field required";

pub fn decode<R: Record>(payload: Value) -> Result<R> {
    let Value::Object(fields) = payload else {
        return Err(SmsdbError::Validation(ValidationErrors::single(
            BODY_FIELD,
            "must be a JSON object",
        )));
    };
    match serde_json::from_value(Value::Object(fields.clone())) {
        Ok(record) => Ok(record),
        Err(_) => Err(SmsdbError::Validation(field_violations::<R>(&fields))),
    }
}

pub fn encode<R: Record>(stored: &Stored<R>) -> Result<Value> {
    Ok(serde_json::to_value(stored)?)
}

fn try_decode<R: Record>(fields: Map<String, Value>) -> std::result::Result<R, serde_json::Error> {
    serde_json::from_value(Value::Object(fields))
}

/// Every violation in a payload that failed to decode as a whole.
fn field_violations<R: Record>(payload: &Map<String, Value>) -> ValidationErrors {
    let template = match serde_json::to_value(R::default()) {
        Ok(Value::Object(template)) => template,
        _ => {
            return ValidationErrors::single(BODY_FIELD, "record schema has no fields");
        }
    };

    let mut violations = Vec::new();
    let mut failed: Vec<&str> = Vec::new();
    let mut merged = template.clone();

    for field in template.keys() {
        let mut single = template.clone();
        match payload.get(field) {
            Some(value) => {
                single.insert(field.clone(), value.clone());
                match try_decode::<R>(single) {
                    Ok(_) => {
                        merged.insert(field.clone(), value.clone());
                    }
                    Err(e) => {
                        violations.push(Violation::new(field.as_str(), e.to_string()));
                        failed.push(field.as_str());
                    }
                }
            }
            None => {
                single.remove(field);
                if try_decode::<R>(single).is_err() {
                    violations.push(Violation::new(field.as_str(), FIELD_REQUIRED));
                    failed.push(field.as_str());
                } else {
                    // Let the schema's own default apply.
                    merged.remove(field);
                }
            }
        }
    }

    match try_decode::<R>(merged) {
        Ok(record) => {
            let mut v = Validator::new();
            record.validate(&mut v);
            if let Err(rules) = v.finish() {
                violations.extend(
                    rules
                        .violations()
                        .iter()
                        .filter(|violation| !failed.contains(&violation.field.as_str()))
                        .cloned(),
                );
            }
        }
        Err(e) if violations.is_empty() => violations.push(Violation::new(BODY_FIELD, e.to_string())),
        Err(_) => {}
    }

    if violations.is_empty() {
        violations.push(Violation::new(BODY_FIELD, "could not be decoded"));
    }
    violations.into_iter().collect()
}
