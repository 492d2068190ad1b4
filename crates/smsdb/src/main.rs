//! # Smsdb Binary
//!
//! The binary is intentionally thin: it hosts the two clients of the
//! `smsdbapp` library and nothing else.
//!
//! - `src/cli/`: argument parsing, configuration overrides, JSON output
//! - `src/http/`: the axum server started by `smsdb serve`
//!
//! Everything from `smsdbapp::api` inward is transport agnostic. This crate
//! owns status codes, exit codes, log subscribers and terminal I/O.

mod cli;
mod http;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
