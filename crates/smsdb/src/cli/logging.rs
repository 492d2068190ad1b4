use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter directive: `RUST_LOG` wins, then `--verbose`, then the configured level.
pub fn filter_directive(env: Option<&str>, verbose: bool, configured: &str) -> String {
    match env {
        Some(directive) if !directive.trim().is_empty() => directive.to_string(),
        _ if verbose => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays JSON.
pub fn init(verbose: bool, configured: &str) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(env.as_deref(), verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
