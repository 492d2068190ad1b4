use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use smsdbapp::api::{EntityKind, SmsdbApi};
use smsdbapp::model::{Campaign, User};
use smsdbapp::store::MemBackend;

fn api() -> SmsdbApi<MemBackend> {
    SmsdbApi::new(MemBackend::new()).unwrap()
}

fn without_storage_id(mut value: Value) -> Value {
    value.as_object_mut().unwrap().remove("storage_id");
    value
}

fn campaign_payload(id: &str) -> Value {
    json!({
        "id": id,
        "nm": "Spring Launch",
        "ds": "Promo blast for the spring bundle",
        "start_dt": "2025-03-01T09:00:00Z",
        "end_dt": "2025-03-15T09:00:00Z",
        "target_audience": ["prepaid", "nairobi"],
        "status": "scheduled",
        "created_dt": "2025-03-01T09:00:00Z"
    })
}

fn user(id: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        nm: "Jane Wanjiru".to_string(),
        email: email.to_string(),
        phone_nb: "+254712345678".to_string(),
        role: "admin".to_string(),
        created_dt: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    }
}

#[test]
fn test_create_then_read_returns_input_plus_storage_id() {
    let api = api();
    let payload = campaign_payload("cmp-1");
    let created = api.create(EntityKind::Campaign, payload.clone()).unwrap();

    let storage_id = created["storage_id"].as_str().unwrap();
    assert!(!storage_id.is_empty());

    let fetched = api.read(EntityKind::Campaign, "cmp-1").unwrap();
    assert_eq!(fetched["storage_id"], created["storage_id"]);
    assert_eq!(without_storage_id(fetched), payload);
}

#[test]
fn test_duplicate_create_leaves_original_untouched() {
    let api = api();
    api.create(EntityKind::Campaign, campaign_payload("cmp-1"))
        .unwrap();

    let mut second = campaign_payload("cmp-1");
    second["nm"] = json!("Overwritten");
    let err = api.create(EntityKind::Campaign, second).unwrap_err();
    assert_eq!(err.kind(), "conflict");

    let fetched = api.read(EntityKind::Campaign, "cmp-1").unwrap();
    assert_eq!(fetched["nm"], "Spring Launch");
    assert_eq!(api.store().count("campaign").unwrap(), 1);
}

#[test]
fn test_user_email_must_be_unique() {
    let api = api();
    api.create_record(user("u-1", "jane@example.com")).unwrap();

    let err = api
        .create_record(user("u-2", "jane@example.com"))
        .unwrap_err();
    assert_eq!(err.kind(), "conflict");
    assert!(err.to_string().contains("email"));

    api.create_record(user("u-2", "otieno@example.com")).unwrap();
}

#[test]
fn test_update_missing_key_does_not_create() {
    let api = api();
    let err = api
        .update(EntityKind::Campaign, "cmp-9", campaign_payload("cmp-9"))
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let err = api.read(EntityKind::Campaign, "cmp-9").unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn test_update_is_full_replace() {
    let api = api();
    let created = api
        .create(EntityKind::Campaign, campaign_payload("cmp-1"))
        .unwrap();

    let mut replacement = campaign_payload("cmp-1");
    replacement["target_audience"] = json!(["postpaid"]);
    replacement["status"] = json!("active");
    replacement["created_dt"] = json!("2025-04-01T00:00:00Z");
    let updated = api
        .update(EntityKind::Campaign, "cmp-1", replacement.clone())
        .unwrap();
    assert_eq!(updated["storage_id"], created["storage_id"]);

    let fetched = api.read(EntityKind::Campaign, "cmp-1").unwrap();
    assert_eq!(without_storage_id(fetched), replacement);
}

#[test]
fn test_update_rejects_invalid_record() {
    let api = api();
    api.create(EntityKind::Campaign, campaign_payload("cmp-1"))
        .unwrap();

    let mut bad = campaign_payload("cmp-1");
    bad["status"] = json!("paused");
    let err = api.update(EntityKind::Campaign, "cmp-1", bad).unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert_eq!(err.violations().unwrap().fields(), vec!["status"]);

    let fetched = api.read(EntityKind::Campaign, "cmp-1").unwrap();
    assert_eq!(fetched["status"], "scheduled");
}

#[test]
fn test_delete_then_read_is_not_found() {
    let api = api();
    api.create(EntityKind::Campaign, campaign_payload("cmp-1"))
        .unwrap();

    let confirmation = api.delete(EntityKind::Campaign, "cmp-1").unwrap();
    assert_eq!(confirmation.message, "Campaign deleted");

    let err = api.read(EntityKind::Campaign, "cmp-1").unwrap_err();
    assert_eq!(err.kind(), "not_found");
    let err = api.delete(EntityKind::Campaign, "cmp-1").unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn test_ussd_service_example() {
    let api = api();
    let payload = json!({
        "cd": "*123*1#",
        "ds": "Balance check",
        "menu_options": ["Check balance"],
        "session_timeout": 60
    });
    api.create(EntityKind::UssdService, payload.clone()).unwrap();

    let fetched = api.read(EntityKind::UssdService, "*123*1#").unwrap();
    assert_eq!(fetched["ds"], "Balance check");

    let err = api.create(EntityKind::UssdService, payload).unwrap_err();
    assert_eq!(err.kind(), "conflict");
}

#[test]
fn test_otp_code_example() {
    let api = api();
    let mut payload = json!({
        "user_id": "u-1",
        "cd": "12345",
        "expiry_dt": "2025-03-01T09:05:00Z"
    });
    let err = api.create(EntityKind::Otp, payload.clone()).unwrap_err();
    assert_eq!(err.violations().unwrap().fields(), vec!["cd"]);

    payload["cd"] = json!("123456");
    api.create(EntityKind::Otp, payload).unwrap();
}

#[test]
fn test_payment_amount_example() {
    let api = api();
    let mut payload = json!({
        "id": "pay-1",
        "user_id": "u-1",
        "amount": -5.00,
        "currency": "USD",
        "status": "completed"
    });
    let err = api.create(EntityKind::Payment, payload.clone()).unwrap_err();
    assert_eq!(err.violations().unwrap().fields(), vec!["amount"]);
    assert_eq!(api.store().count("payment").unwrap(), 0);

    payload["amount"] = json!(5.00);
    api.create(EntityKind::Payment, payload).unwrap();
}

#[test]
fn test_storage_failure_surfaces_as_storage_error() {
    let api = api();
    api.store().set_simulate_write_error(true);
    let err = api
        .create(EntityKind::Campaign, campaign_payload("cmp-1"))
        .unwrap_err();
    assert_eq!(err.kind(), "storage");

    api.store().set_simulate_write_error(false);
    assert_eq!(
        api.read(EntityKind::Campaign, "cmp-1").unwrap_err().kind(),
        "not_found"
    );
}

#[test]
fn test_typed_read_returns_stored_wrapper() {
    let api = api();
    let created = api
        .create(EntityKind::Campaign, campaign_payload("cmp-1"))
        .unwrap();
    let stored = api.read_record::<Campaign>("cmp-1").unwrap();
    assert_eq!(stored.record.id, "cmp-1");
    assert_eq!(
        serde_json::to_value(stored.storage_id).unwrap(),
        created["storage_id"]
    );
}
