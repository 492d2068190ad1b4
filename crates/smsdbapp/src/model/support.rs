use super::{CollectionSpec, Operation, Record};
use crate::validation::{Rule, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TICKET_STATUSES: &[&str] = &["open", "resolved", "closed"];
pub const SUPPORT_CATEGORIES: &[&str] = &["billing", "technical", "general"];
pub const SUPPORT_STATUSES: &[&str] = &["open", "in_progress", "resolved"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub user_id: String,
    pub ds: String,
    pub status: String,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_option")]
    pub resolved_dt: Option<DateTime<Utc>>,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Ticket {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Ticket",
        collection: "ticket",
        route: "ticket",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::CREATE_ONLY,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("ds", &self.ds, &[Rule::max_len(500)])
            .text("status", &self.status, &[Rule::OneOf(TICKET_STATUSES)]);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub id: String,
    pub user_id: String,
    pub ds: String,
    pub category: String,
    pub status: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Support {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Support",
        collection: "support",
        route: "support",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::CREATE_ONLY,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("ds", &self.ds, &[Rule::max_len(500)])
            .text("category", &self.category, &[Rule::OneOf(SUPPORT_CATEGORIES)])
            .text("status", &self.status, &[Rule::OneOf(SUPPORT_STATUSES)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn valid_samples_pass() {
        assert!(sample_ticket("t-1").check().is_ok());
        assert!(sample_support("s-1").check().is_ok());
    }

    #[test]
    fn ticket_resolved_dt_is_optional() {
        let mut value = serde_json::to_value(sample_ticket("t-1")).unwrap();
        value.as_object_mut().unwrap().remove("resolved_dt");
        let ticket: Ticket = serde_json::from_value(value).unwrap();
        assert!(ticket.resolved_dt.is_none());
    }

    #[test]
    fn support_in_progress_is_a_status() {
        let mut request = sample_support("s-1");
        request.status = "in_progress".into();
        assert!(request.check().is_ok());
        request.category = "sales".into();
        let errors = request.check().unwrap_err();
        assert_eq!(errors.fields(), vec!["category"]);
    }
}
