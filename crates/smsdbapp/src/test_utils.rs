use crate::api::{EntityKind, SmsdbApi};
use crate::commands::ensure_indexes;
use crate::model::{
    Analytics, Campaign, Order, Otp, Payment, Permission, Profile, Scheduler, Service, Shortcode,
    SmsGateway, Support, Ticket, User, UssdService,
};
use crate::store::{FsBackend, MemBackend};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tempfile::TempDir;

/// An API over a filesystem store in a fresh temporary directory.
pub struct TestEnv {
    // Keeps the directory alive until the test is done.
    pub _temp_dir: TempDir,
    pub api: SmsdbApi<FsBackend>,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let store = FsBackend::open(&root).expect("failed to open store");
        let api = SmsdbApi::new(store).expect("failed to declare indexes");
        Self {
            _temp_dir: temp_dir,
            api,
            root,
        }
    }
}

pub fn mem_api() -> SmsdbApi<MemBackend> {
    SmsdbApi::new(MemBackend::new()).expect("failed to declare indexes")
}

/// A memory store with every catalog index declared.
pub fn indexed_mem_store() -> MemBackend {
    let store = MemBackend::new();
    for kind in EntityKind::ALL {
        ensure_indexes(&store, &kind.spec()).expect("failed to declare indexes");
    }
    store
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

pub fn sample_campaign(id: &str) -> Campaign {
    Campaign {
        id: id.to_string(),
        nm: "Spring Launch".to_string(),
        ds: "Promo blast for the spring bundle".to_string(),
        start_dt: fixed_time(),
        end_dt: fixed_time() + Duration::days(14),
        target_audience: vec!["prepaid".to_string(), "nairobi".to_string()],
        status: "scheduled".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_ussd_service(cd: &str) -> UssdService {
    UssdService {
        cd: cd.to_string(),
        ds: "Balance check".to_string(),
        menu_options: vec!["Check balance".to_string()],
        session_timeout: 60,
        created_dt: fixed_time(),
    }
}

pub fn sample_shortcode(cd: &str) -> Shortcode {
    Shortcode {
        cd: cd.to_string(),
        kind: "dedicated".to_string(),
        ds: "Customer care line".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_analytics(campaign_id: &str) -> Analytics {
    let mut metrics = Map::new();
    metrics.insert("sent".to_string(), json!(1000));
    metrics.insert("clicked".to_string(), json!(87));
    Analytics {
        campaign_id: campaign_id.to_string(),
        delivery_rt: 97.5,
        metrics,
        timestamp_dt: fixed_time(),
    }
}

pub fn sample_otp(user_id: &str, cd: &str) -> Otp {
    Otp {
        user_id: user_id.to_string(),
        cd: cd.to_string(),
        expiry_dt: fixed_time() + Duration::minutes(5),
        created_dt: fixed_time(),
    }
}

pub fn sample_gateway(id: &str) -> SmsGateway {
    SmsGateway {
        id: id.to_string(),
        nm: "Primary gateway".to_string(),
        api_endpoint: "https://gw.example.com/v1/send".to_string(),
        api_key: "sk_test_0123456789".to_string(),
        status: "active".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_user(id: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        nm: "Jane Wanjiru".to_string(),
        email: email.to_string(),
        phone_nb: "+254712345678".to_string(),
        role: "user".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_scheduler(id: &str) -> Scheduler {
    Scheduler {
        id: id.to_string(),
        nm: "Morning send".to_string(),
        ds: "Daily 9am push".to_string(),
        campaign_id: Some("cmp-1".to_string()),
        schedule_dt: fixed_time() + Duration::days(1),
        status: "pending".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_service(id: &str) -> Service {
    Service {
        id: id.to_string(),
        nm: "Bulk SMS".to_string(),
        ds: "Outbound bulk messaging".to_string(),
        kind: "sms".to_string(),
        status: "active".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_ticket(id: &str) -> Ticket {
    Ticket {
        id: id.to_string(),
        user_id: "u-1".to_string(),
        ds: "Messages not delivered".to_string(),
        status: "open".to_string(),
        resolved_dt: None,
        created_dt: fixed_time(),
    }
}

pub fn sample_payment(id: &str, amount: f64, currency: &str) -> Payment {
    Payment {
        id: id.to_string(),
        user_id: "u-1".to_string(),
        amount,
        currency: currency.to_string(),
        status: "completed".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_profile(id: &str) -> Profile {
    Profile {
        id: id.to_string(),
        user_id: "u-1".to_string(),
        full_nm: "Jane Wanjiru".to_string(),
        address: Some("Moi Avenue, Nairobi".to_string()),
        created_dt: fixed_time(),
    }
}

pub fn sample_permission(id: &str) -> Permission {
    Permission {
        id: id.to_string(),
        nm: "campaign:write".to_string(),
        ds: "Create and edit campaigns".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_order(id: &str) -> Order {
    Order {
        id: id.to_string(),
        user_id: "u-1".to_string(),
        service_id: "svc-1".to_string(),
        amount: 25.0,
        status: "pending".to_string(),
        created_dt: fixed_time(),
    }
}

pub fn sample_support(id: &str) -> Support {
    Support {
        id: id.to_string(),
        user_id: "u-1".to_string(),
        ds: "Invoice shows the wrong amount".to_string(),
        category: "billing".to_string(),
        status: "open".to_string(),
        created_dt: fixed_time(),
    }
}

/// JSON payload for the USSD balance-check service.
pub fn ussd_payload(cd: &str) -> Value {
    json!({
        "cd": cd,
        "ds": "Balance check",
        "menu_options": ["Check balance"],
        "session_timeout": 60
    })
}
