use super::{CollectionSpec, Operation, Record};
use crate::validation::patterns::{SHORTCODE, USSD_CODE};
use crate::validation::{Rule, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CAMPAIGN_STATUSES: &[&str] = &["active", "completed", "scheduled"];
pub const SHORTCODE_TYPES: &[&str] = &["dedicated", "shared"];
pub const GATEWAY_STATUSES: &[&str] = &["active", "inactive"];
pub const SCHEDULER_STATUSES: &[&str] = &["pending", "completed", "failed"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub nm: String,
    pub ds: String,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub start_dt: DateTime<Utc>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub end_dt: DateTime<Utc>,
    pub target_audience: Vec<String>,
    pub status: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Campaign {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Campaign",
        collection: "campaign",
        route: "campaigns",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::ALL,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("nm", &self.nm, &[Rule::Length { min: 1, max: 100 }])
            .text("ds", &self.ds, &[Rule::max_len(500)])
            .items("target_audience", &self.target_audience, &[Rule::MinItems(1)])
            .text("status", &self.status, &[Rule::OneOf(CAMPAIGN_STATUSES)]);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UssdService {
    pub cd: String,
    pub ds: String,
    pub menu_options: Vec<String>,
    pub session_timeout: i64,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for UssdService {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "USSD Service",
        collection: "ussd_service",
        route: "ussd-services",
        key_field: "cd",
        unique_fields: &["cd"],
        operations: Operation::ALL,
    };

    fn key(&self) -> &str {
        &self.cd
    }

    fn validate(&self, v: &mut Validator) {
        v.text("cd", &self.cd, &[Rule::Pattern(&USSD_CODE)])
            .text("ds", &self.ds, &[Rule::max_len(200)])
            .items("menu_options", &self.menu_options, &[Rule::MinItems(1)])
            .number(
                "session_timeout",
                self.session_timeout as f64,
                &[Rule::between(30.0, 300.0)],
            );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shortcode {
    pub cd: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ds: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Shortcode {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Shortcode",
        collection: "shortcode",
        route: "shortcodes",
        key_field: "cd",
        unique_fields: &["cd"],
        operations: Operation::ALL,
    };

    fn key(&self) -> &str {
        &self.cd
    }

    fn validate(&self, v: &mut Validator) {
        v.text("cd", &self.cd, &[Rule::Pattern(&SHORTCODE)])
            .text("type", &self.kind, &[Rule::OneOf(SHORTCODE_TYPES)])
            .text("ds", &self.ds, &[Rule::max_len(200)]);
    }
}

/// Delivery snapshot for a campaign. Immutable once recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub campaign_id: String,
    pub delivery_rt: f64,
    /// Engagement stats, stored as given.
    pub metrics: Map<String, Value>,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub timestamp_dt: DateTime<Utc>,
}

impl Record for Analytics {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Analytics",
        collection: "analytic",
        route: "analytics",
        key_field: "campaign_id",
        unique_fields: &[],
        operations: Operation::TRANSIENT,
    };

    fn key(&self) -> &str {
        &self.campaign_id
    }

    fn validate(&self, v: &mut Validator) {
        v.number("delivery_rt", self.delivery_rt, &[Rule::between(0.0, 100.0)]);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmsGateway {
    pub id: String,
    pub nm: String,
    pub api_endpoint: String,
    pub api_key: String,
    pub status: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for SmsGateway {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "SMS Gateway",
        collection: "gateway",
        route: "sms-gateways",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::ALL,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("nm", &self.nm, &[Rule::max_len(100)])
            .text("api_key", &self.api_key, &[Rule::min_len(10)])
            .text("status", &self.status, &[Rule::OneOf(GATEWAY_STATUSES)]);
    }
}

/// A scheduled send. The schedule is data only; nothing here executes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    pub id: String,
    pub nm: String,
    pub ds: String,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub schedule_dt: DateTime<Utc>,
    pub status: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Scheduler {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Scheduler",
        collection: "scheduler",
        route: "scheduler",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::CREATE_ONLY,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("nm", &self.nm, &[Rule::max_len(100)])
            .text("ds", &self.ds, &[Rule::max_len(500)])
            .text("status", &self.status, &[Rule::OneOf(SCHEDULER_STATUSES)]);
    }
}
