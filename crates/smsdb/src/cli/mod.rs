//! # CLI Behavior
//!
//! This is **one possible client** for smsdb, not the application itself.
//! It talks to the same [`smsdbapp::api::SmsdbApi`] the HTTP server does,
//! against the configured store, so records written here are visible to a
//! server started on the same data directory.
//!
//! ## Commands
//!
//! - `smsdb entities`: the collection catalog (routes, keys, operations)
//! - `smsdb create <entity> [--file f]`: payload from the file or stdin
//! - `smsdb get <entity> <key>`
//! - `smsdb update <entity> <key> [--file f]`
//! - `smsdb delete <entity> <key>`
//! - `smsdb serve [--bind addr]`: the HTTP server
//! - `smsdb config`: the effective settings after files, env and flags
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap, version string
//! - `commands`: Configuration, dispatch and JSON output
//! - `logging`: tracing subscriber setup

mod commands;
mod logging;
pub mod setup;

pub use commands::run;
