use super::{CollectionSpec, Operation, Record};
use crate::validation::patterns::CURRENCY_CODE;
use crate::validation::{Rule, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SERVICE_TYPES: &[&str] = &["sms", "ussd"];
pub const SERVICE_STATUSES: &[&str] = &["active", "inactive"];
pub const PAYMENT_STATUSES: &[&str] = &["pending", "completed", "failed"];
pub const ORDER_STATUSES: &[&str] = &["pending", "completed"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub nm: String,
    pub ds: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Service {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Service",
        collection: "service",
        route: "service",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::CREATE_ONLY,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("nm", &self.nm, &[Rule::max_len(100)])
            .text("ds", &self.ds, &[Rule::max_len(200)])
            .text("type", &self.kind, &[Rule::OneOf(SERVICE_TYPES)])
            .text("status", &self.status, &[Rule::OneOf(SERVICE_STATUSES)]);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Payment {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Payment",
        collection: "payment",
        route: "payment",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::CREATE_ONLY,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.number("amount", self.amount, &[Rule::greater_than(0.0)])
            .text("currency", &self.currency, &[Rule::Pattern(&CURRENCY_CODE)])
            .text("status", &self.status, &[Rule::OneOf(PAYMENT_STATUSES)]);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub service_id: String,
    pub amount: f64,
    pub status: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Order {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Order",
        collection: "order",
        route: "order",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::CREATE_ONLY,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.number("amount", self.amount, &[Rule::greater_than(0.0)])
            .text("status", &self.status, &[Rule::OneOf(ORDER_STATUSES)]);
    }
}
