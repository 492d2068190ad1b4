use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.1.0"
/// Format for dev builds: "v0.1.0\ndev: abc1234 2025-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "smsdb",
    bin_name = "smsdb",
    version = get_version(),
    disable_help_subcommand = true,
    after_help = "Payloads are JSON objects, read from --file or stdin.\nRun `smsdb entities` for the collection names."
)]
#[command(about = "Validated SMS/USSD record collections over HTTP and the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: smsdb.toml in the OS config directory)
    #[arg(long, global = true, env = "SMSDB_CONFIG", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Directory for the fs backend's collection files
    #[arg(long, global = true, help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Storage engine: fs or memory
    #[arg(long, global = true, help_heading = "Options")]
    pub backend: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the collections and the operations each one supports
    #[command(alias = "ls", display_order = 1)]
    Entities,

    /// Create a record
    #[command(alias = "new", display_order = 2)]
    Create {
        /// Collection route or name (e.g. ussd-services)
        entity: String,

        /// JSON payload file (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Fetch a record by key
    #[command(alias = "show", display_order = 3)]
    Get { entity: String, key: String },

    /// Replace a record
    #[command(display_order = 4)]
    Update {
        entity: String,
        key: String,

        /// JSON payload file (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a record
    #[command(alias = "rm", display_order = 5)]
    Delete { entity: String, key: String },

    /// Run the HTTP server
    #[command(display_order = 10)]
    Serve {
        /// Listen address (overrides `bind` from config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show the effective configuration
    #[command(display_order = 11)]
    Config,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
