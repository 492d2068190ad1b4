//! # Domain Model: Records, Keys and Storage Identifiers
//!
//! This module defines the fifteen record schemas and the pieces every one of
//! them shares: the [`Record`] trait, the declarative [`CollectionSpec`], the
//! engine-assigned [`StorageId`] and the persisted wrapper [`Stored`].
//!
//! ## Application Keys
//!
//! Each collection names one field as its application key (`id` for most,
//! `cd` for USSD services and shortcodes). Keys are supplied by the client,
//! never change after creation, and are the only way to address a record.
//!
//! Two collections are transient logs rather than keyed registries:
//! analytics snapshots (looked up by `campaign_id`) and OTP codes (looked up by
//! `user_id`). Their key is a lookup index, not a unique one; several records
//! may share it and lookups return the earliest inserted match.
//!
//! ## Storage Identifiers
//!
//! The engine assigns a [`StorageId`] on insert. It never appears in the record
//! types themselves, so it cannot be supplied by a client or written back on
//! update. [`Stored<R>`] pairs a record with its identifier and serializes
//! flat, with the identifier under `storage_id`:
//!
//! ```text
//! {"cd": "*123*1#", "ds": "Balance check", ..., "storage_id": "5f0c…"}
//! ```
//!
//! ## Collection Catalog
//!
//! | Entity | Collection | Key | Unique | Operations |
//! |--------|------------|-----|--------|------------|
//! | Campaign | `campaign` | `id` | `id` | C R U D |
//! | USSD Service | `ussd_service` | `cd` | `cd` | C R U D |
//! | Shortcode | `shortcode` | `cd` | `cd` | C R U D |
//! | Analytics | `analytic` | `campaign_id` | - | C R D |
//! | OTP | `otp` | `user_id` | - | C R D |
//! | SMS Gateway | `gateway` | `id` | `id` | C R U D |
//! | User | `user` | `id` | `id`, `email` | C R U D |
//! | Scheduler, Service, Ticket, Payment, Profile, Permission, Order, Support | ... | `id` | `id` | C |

mod accounts;
mod billing;
mod marketing;
mod support;
mod timestamp;

pub use accounts::{Otp, Permission, Profile, User};
pub use billing::{Order, Payment, Service};
pub use marketing::{Analytics, Campaign, Scheduler, Shortcode, SmsGateway, UssdService};
pub use support::{Support, Ticket};

use crate::store::IndexSpec;
use crate::validation::{ValidationErrors, Validator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];
    pub const TRANSIENT: &'static [Operation] =
        &[Operation::Create, Operation::Read, Operation::Delete];
    pub const CREATE_ONLY: &'static [Operation] = &[Operation::Create];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionSpec {
    /// Human readable entity name, used in messages.
    pub entity: &'static str,
    /// Storage collection name.
    pub collection: &'static str,
    /// Route segment for the endpoint group (`ussd-services`).
    pub route: &'static str,
    pub key_field: &'static str,
    /// Fields carrying a unique index. Empty for transient collections.
    pub unique_fields: &'static [&'static str],
    pub operations: &'static [Operation],
}

impl CollectionSpec {
    pub fn supports(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    pub fn key_is_unique(&self) -> bool {
        self.unique_fields.contains(&self.key_field)
    }

    /// Indexes the storage engine must maintain for this collection.
    pub fn indexes(&self) -> Vec<IndexSpec> {
        let mut indexes: Vec<IndexSpec> = self
            .unique_fields
            .iter()
            .map(|field| IndexSpec::unique(*field))
            .collect();
        if !self.key_is_unique() {
            indexes.insert(0, IndexSpec::lookup(self.key_field));
        }
        indexes
    }
}

/// Identifier assigned by the storage engine at insert time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageId(Uuid);

impl StorageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for StorageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A record schema bound to its collection.
///
/// Implementors describe their collection through [`Record::SPEC`] and their
/// field constraints through [`Record::validate`]; everything else (existence
/// checks, inserts, lookups, identity reconciliation) is generic.
pub trait Record:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    const SPEC: CollectionSpec;

    /// The application key value.
    fn key(&self) -> &str;

    /// Record every broken field constraint into `v`.
    fn validate(&self, v: &mut Validator);

    /// Value of a uniquely indexed field. Only the key is known generically;
    /// schemas with extra unique fields override this.
    fn unique_value(&self, field: &str) -> Option<&str> {
        (field == Self::SPEC.key_field).then(|| self.key())
    }

    /// Canonicalise field values before validation and storage.
    fn normalize(&mut self) {}

    fn check(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        self.validate(&mut v);
        v.finish()
    }
}

/// A record that has been persisted, with its engine-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<R> {
    #[serde(flatten)]
    pub record: R,
    pub storage_id: StorageId,
}

impl<R> Stored<R> {
    pub fn new(storage_id: StorageId, record: R) -> Self {
        Self { record, storage_id }
    }

    pub fn into_record(self) -> R {
        self.record
    }
}

fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}
