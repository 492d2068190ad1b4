//! # Smsdb Architecture
//!
//! Smsdb is a **UI-agnostic record library** for an SMS/USSD marketing platform.
//! It keeps fifteen document collections (campaigns, USSD services, shortcodes,
//! users, payments and friends) validated and consistently keyed. The HTTP server
//! and the command-line client in the `smsdb` crate are thin clients over it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Clients (smsdb crate: http/, cli/)                         │
//! │  - Routing, argument parsing, status codes, exit codes      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs, mapping.rs)                             │
//! │  - Resolves collection names to record types                │
//! │  - Decodes JSON payloads, encodes persisted records         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - create / read / update / delete, generic over Record     │
//! │  - Validation, uniqueness checks, identity reconciliation   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract DocumentStore trait                             │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Identifiers
//!
//! Every record carries an **application key** chosen by the client (a campaign
//! id, a USSD code, a shortcode...) and gets a **storage identifier** from the
//! engine when it is inserted. Keys drive every lookup; storage identifiers are
//! only ever reported back. A record that has not been persisted is a plain
//! record type (`Campaign`); one that has is a [`model::Stored`] wrapper, so the
//! "identifier present" state lives in the type, not in a nullable field.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments and returns regular
//! Rust types. It never writes to stdout/stderr and never assumes a terminal or
//! a network. Logging goes through `tracing`; subscribers are the client's call.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Generic create/read/update/delete over any [`model::Record`]
//! - [`mapping`]: JSON payload decoding and response encoding
//! - [`model`]: Record schemas, collection specs, storage identifiers
//! - [`validation`]: Named field rules and the violation collector
//! - [`store`]: Storage engine abstraction and implementations
//! - [`config`]: Layered configuration
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod mapping;
pub mod model;
pub mod store;
pub mod validation;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
