use super::{CollectionSpec, Operation, Record};
use crate::validation::patterns::{EMAIL, OTP_CODE, PHONE_NUMBER};
use crate::validation::{Rule, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USER_ROLES: &[&str] = &["admin", "user"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nm: String,
    pub email: String,
    pub phone_nb: String,
    pub role: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for User {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "User",
        collection: "user",
        route: "users",
        key_field: "id",
        unique_fields: &["id", "email"],
        operations: Operation::ALL,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("nm", &self.nm, &[Rule::max_len(100)])
            .text("email", &self.email, &[Rule::Pattern(&EMAIL)])
            .text("phone_nb", &self.phone_nb, &[Rule::Pattern(&PHONE_NUMBER)])
            .text("role", &self.role, &[Rule::OneOf(USER_ROLES)]);
    }

    fn unique_value(&self, field: &str) -> Option<&str> {
        match field {
            "id" => Some(&self.id),
            "email" => Some(&self.email),
            _ => None,
        }
    }

    /// Domains are case-insensitive, so `jane@Example.COM` is stored as
    /// `jane@example.com`. The local part is kept as given.
    fn normalize(&mut self) {
        if let Some((local, domain)) = self.email.rsplit_once('@') {
            self.email = format!("{}@{}", local, domain.to_ascii_lowercase());
        }
    }
}

/// A one-time password issued to a user. Several may be live for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Otp {
    pub user_id: String,
    pub cd: String,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub expiry_dt: DateTime<Utc>,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Otp {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "OTP",
        collection: "otp",
        route: "otp",
        key_field: "user_id",
        unique_fields: &[],
        operations: Operation::TRANSIENT,
    };

    fn key(&self) -> &str {
        &self.user_id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("cd", &self.cd, &[Rule::Pattern(&OTP_CODE)]);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub full_nm: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Profile {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Profile",
        collection: "profile",
        route: "profile",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::CREATE_ONLY,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("full_nm", &self.full_nm, &[Rule::max_len(100)])
            .optional_text("address", self.address.as_deref(), &[Rule::max_len(200)]);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub nm: String,
    pub ds: String,
    #[serde(default = "super::now", deserialize_with = "super::timestamp::deserialize")]
    pub created_dt: DateTime<Utc>,
}

impl Record for Permission {
    const SPEC: CollectionSpec = CollectionSpec {
        entity: "Permission",
        collection: "permission",
        route: "permission",
        key_field: "id",
        unique_fields: &["id"],
        operations: Operation::CREATE_ONLY,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self, v: &mut Validator) {
        v.text("nm", &self.nm, &[Rule::max_len(50)])
            .text("ds", &self.ds, &[Rule::max_len(200)]);
    }
}
