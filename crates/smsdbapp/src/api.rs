//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for all smsdb operations, whichever client is talking.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Declares indexes** for every collection when it is built
//! - **Resolves** collection names (`"ussd-services"`, `"ussd_service"`) to an
//!   [`EntityKind`]
//! - **Decodes** JSON payloads into typed records and encodes results back
//! - **Dispatches** to the generic command for the resolved record type
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Transport concerns**: no status codes, no exit codes, no stdout
//!
//! ## Dynamic and Typed Entry Points
//!
//! Clients that only know a collection name at runtime (HTTP routes, the CLI)
//! use [`SmsdbApi::create`], [`SmsdbApi::read`], [`SmsdbApi::update`] and
//! [`SmsdbApi::delete`], which speak `serde_json::Value`. Rust callers that
//! know the record type use the `*_record` variants and get typed
//! [`Stored<R>`] values back.
//!
//! ## Generic Over DocumentStore
//!
//! `SmsdbApi<S: DocumentStore>` is generic over the storage engine:
//! - Production: `SmsdbApi<Box<dyn DocumentStore>>` from [`crate::store::open`]
//! - Testing: `SmsdbApi<MemBackend>`

use crate::commands::{self, DeleteConfirmation};
use crate::error::{Result, SmsdbError};
use crate::mapping;
use crate::model::{
    Analytics, Campaign, CollectionSpec, Operation, Order, Otp, Payment, Permission, Profile,
    Record, Scheduler, Service, Shortcode, SmsGateway, Stored, Support, Ticket, User, UssdService,
};
use crate::store::DocumentStore;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Every collection smsdb manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Campaign,
    UssdService,
    Shortcode,
    Analytics,
    Otp,
    SmsGateway,
    User,
    Scheduler,
    Service,
    Ticket,
    Payment,
    Profile,
    Permission,
    Order,
    Support,
}

/// Run `$body` with `$R` bound to the record type of `$kind`.
macro_rules! dispatch {
    ($kind:expr, $R:ident => $body:expr) => {
        match $kind {
            EntityKind::Campaign => {
                type $R = Campaign;
                $body
            }
            EntityKind::UssdService => {
                type $R = UssdService;
                $body
            }
            EntityKind::Shortcode => {
                type $R = Shortcode;
                $body
            }
            EntityKind::Analytics => {
                type $R = Analytics;
                $body
            }
            EntityKind::Otp => {
                type $R = Otp;
                $body
            }
            EntityKind::SmsGateway => {
                type $R = SmsGateway;
                $body
            }
            EntityKind::User => {
                type $R = User;
                $body
            }
            EntityKind::Scheduler => {
                type $R = Scheduler;
                $body
            }
            EntityKind::Service => {
                type $R = Service;
                $body
            }
            EntityKind::Ticket => {
                type $R = Ticket;
                $body
            }
            EntityKind::Payment => {
                type $R = Payment;
                $body
            }
            EntityKind::Profile => {
                type $R = Profile;
                $body
            }
            EntityKind::Permission => {
                type $R = Permission;
                $body
            }
            EntityKind::Order => {
                type $R = Order;
                $body
            }
            EntityKind::Support => {
                type $R = Support;
                $body
            }
        }
    };
}

impl EntityKind {
    pub const ALL: [EntityKind; 15] = [
        EntityKind::Campaign,
        EntityKind::UssdService,
        EntityKind::Shortcode,
        EntityKind::Analytics,
        EntityKind::Otp,
        EntityKind::SmsGateway,
        EntityKind::User,
        EntityKind::Scheduler,
        EntityKind::Service,
        EntityKind::Ticket,
        EntityKind::Payment,
        EntityKind::Profile,
        EntityKind::Permission,
        EntityKind::Order,
        EntityKind::Support,
    ];

    pub fn spec(&self) -> CollectionSpec {
        dispatch!(self, R => R::SPEC)
    }

    /// Look up a kind by route segment or collection name.
    pub fn resolve(name: &str) -> Option<EntityKind> {
        let name = name.trim().trim_matches('/');
        Self::ALL.into_iter().find(|kind| {
            let spec = kind.spec();
            spec.route.eq_ignore_ascii_case(name) || spec.collection.eq_ignore_ascii_case(name)
        })
    }

    pub fn ensure_supports(&self, operation: Operation) -> Result<()> {
        let spec = self.spec();
        if spec.supports(operation) {
            Ok(())
        } else {
            Err(SmsdbError::UnsupportedOperation {
                entity: spec.entity,
                operation,
            })
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().collection)
    }
}

impl FromStr for EntityKind {
    type Err = SmsdbError;

    fn from_str(s: &str) -> Result<Self> {
        EntityKind::resolve(s).ok_or_else(|| SmsdbError::UnknownEntity(s.to_string()))
    }
}

/// The main API facade for smsdb operations.
///
/// All clients (HTTP, CLI) should interact through this API.
pub struct SmsdbApi<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> SmsdbApi<S> {
    /// Wrap a store, declaring the indexes of every collection on it.
    pub fn new(store: S) -> Result<Self> {
        for kind in EntityKind::ALL {
            commands::ensure_indexes(&store, &kind.spec())?;
        }
        Ok(Self { store })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> Vec<CollectionSpec> {
        EntityKind::ALL.iter().map(|kind| kind.spec()).collect()
    }

    pub fn create(&self, kind: EntityKind, payload: Value) -> Result<Value> {
        kind.ensure_supports(Operation::Create)?;
        dispatch!(kind, R => {
            let record: R = mapping::decode(payload)?;
            mapping::encode(&self.create_record(record)?)
        })
    }

    pub fn read(&self, kind: EntityKind, key: &str) -> Result<Value> {
        kind.ensure_supports(Operation::Read)?;
        dispatch!(kind, R => mapping::encode(&self.read_record::<R>(key)?))
    }

    pub fn update(&self, kind: EntityKind, key: &str, payload: Value) -> Result<Value> {
        kind.ensure_supports(Operation::Update)?;
        dispatch!(kind, R => {
            let record: R = mapping::decode(payload)?;
            mapping::encode(&self.update_record(key, record)?)
        })
    }

    pub fn delete(&self, kind: EntityKind, key: &str) -> Result<DeleteConfirmation> {
        kind.ensure_supports(Operation::Delete)?;
        dispatch!(kind, R => self.delete_record::<R>(key))
    }

    pub fn create_record<R: Record>(&self, record: R) -> Result<Stored<R>> {
        commands::create::run(&self.store, record)
    }

    pub fn read_record<R: Record>(&self, key: &str) -> Result<Stored<R>> {
        commands::read::run(&self.store, key)
    }

    pub fn update_record<R: Record>(&self, key: &str, record: R) -> Result<Stored<R>> {
        commands::update::run(&self.store, key, record)
    }

    pub fn delete_record<R: Record>(&self, key: &str) -> Result<DeleteConfirmation> {
        commands::delete::run::<S, R>(&self.store, key)
    }
}
