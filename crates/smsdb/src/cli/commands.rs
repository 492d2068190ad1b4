//! # CLI Layer
//!
//! This module is **one possible client** for smsdb, next to the HTTP server.
//!
//! The CLI layer is the **only** place in the binary that:
//! - Knows about stdout, stderr and stdin
//! - Turns errors into exit codes (via `main`)
//! - Applies command-line overrides on top of the loaded configuration
//!
//! Every record command prints the API's JSON result to stdout, pretty-printed.
//! Failures are reported on stderr by `main` and exit with status 1.

use super::logging;
use super::setup::{parse_cli, Cli, Commands};
use crate::http;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use smsdbapp::api::{EntityKind, SmsdbApi};
use smsdbapp::config::SmsdbConfig;
use smsdbapp::store::{self, DocumentStore};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub fn run() -> Result<()> {
    let cli = parse_cli();
    let config = effective_config(&cli)?;
    logging::init(cli.verbose, &config.log_level);
    debug!(backend = %config.backend, data_dir = %config.data_dir().display(), "configuration loaded");

    match cli.command {
        Commands::Config => print_json(&config_view(&config)),
        Commands::Entities => print_json(&catalog()),
        Commands::Serve { .. } => handle_serve(&config),
        Commands::Create { entity, file } => {
            let kind: EntityKind = entity.parse()?;
            let payload = read_payload(file.as_deref())?;
            print_json(&open_api(&config)?.create(kind, payload)?)
        }
        Commands::Get { entity, key } => {
            let kind: EntityKind = entity.parse()?;
            print_json(&open_api(&config)?.read(kind, &key)?)
        }
        Commands::Update { entity, key, file } => {
            let kind: EntityKind = entity.parse()?;
            let payload = read_payload(file.as_deref())?;
            print_json(&open_api(&config)?.update(kind, &key, payload)?)
        }
        Commands::Delete { entity, key } => {
            let kind: EntityKind = entity.parse()?;
            print_json(&open_api(&config)?.delete(kind, &key)?)
        }
    }
}

/// Loaded configuration with command-line flags applied on top.
fn effective_config(cli: &Cli) -> Result<SmsdbConfig> {
    let mut config = SmsdbConfig::load(cli.config.as_deref())?;
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut SmsdbConfig, cli: &Cli) {
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(backend) = &cli.backend {
        config.backend = backend.clone();
    }
    if let Commands::Serve {
        bind: Some(bind), ..
    } = &cli.command
    {
        config.bind = bind.clone();
    }
}

fn open_api(config: &SmsdbConfig) -> Result<SmsdbApi<Box<dyn DocumentStore>>> {
    let kind = config.backend_kind()?;
    let data_dir = config.data_dir();
    let store = store::open(kind, &data_dir)
        .with_context(|| format!("failed to open {} store at {}", kind, data_dir.display()))?;
    Ok(SmsdbApi::new(store)?)
}

fn handle_serve(config: &SmsdbConfig) -> Result<()> {
    let addr = config.bind_addr()?;
    let api = Arc::new(open_api(config)?);
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(http::serve(api, addr))
}

fn read_payload(file: Option<&Path>) -> Result<Value> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read payload from stdin")?;
            buf
        }
    };
    parse_payload(&text)
}

fn parse_payload(text: &str) -> Result<Value> {
    serde_json::from_str(text).context("payload is not valid JSON")
}

#[derive(Serialize)]
struct CatalogEntry {
    entity: &'static str,
    collection: &'static str,
    route: &'static str,
    key: &'static str,
    operations: Vec<String>,
}

fn catalog() -> Vec<CatalogEntry> {
    EntityKind::ALL
        .iter()
        .map(|kind| {
            let spec = kind.spec();
            CatalogEntry {
                entity: spec.entity,
                collection: spec.collection,
                route: spec.route,
                key: spec.key_field,
                operations: spec.operations.iter().map(|op| op.to_string()).collect(),
            }
        })
        .collect()
}

fn config_view(config: &SmsdbConfig) -> Value {
    json!({
        "data_dir": config.data_dir(),
        "backend": config.backend,
        "bind": config.bind,
        "log_level": config.log_level,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
