//! CLI argument definitions for invex.

use clap::{Args, Parser, Subcommand, ValueEnum};
use ix_cli_common::{LogLevel, parse_positive_usize};
use std::path::PathBuf;

/// Search and size S3 inventory reports.
///
/// Locates the newest inventory manifest per source bucket, then streams the
/// manifest's compressed part-files to find folders matching a search string
/// or to total object sizes by path prefix.
///
/// ## Examples
///
/// Find the latest manifests in an inventory destination bucket:
///   invex manifests fetch inventory-dest
///
/// Search for folders containing "logs":
///   invex search -b inventory-dest -m inv/src/cfg/2024-05-01T00-00Z/manifest.json logs
///
/// Sizes of the first two path levels, as a table:
///   invex --format table path-size -b inventory-dest -m <manifest-key> --depth 2
///
/// Offline, against a directory where each subdirectory is a bucket:
///   invex --local-root ./fixtures search -b dest -m <manifest-key> logs
#[derive(Parser, Debug)]
#[command(name = "invex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    // === State ===
    /// Directory holding bucket_history.json and manifest_cache.json
    #[arg(long, env = "IX_STATE_DIR", default_value = ".", global = true)]
    pub state_dir: PathBuf,

    // === Execution ===
    /// Maximum part-files processed at once (must be >= 1)
    #[arg(long, default_value = "10", value_parser = parse_positive_usize, global = true)]
    pub max_concurrent_parts: usize,

    /// Rows per parsed chunk (must be >= 1)
    #[arg(long, default_value = "100000", value_parser = parse_positive_usize, global = true)]
    pub chunk_size: usize,

    // === Output ===
    /// Output format
    #[arg(long, value_enum, default_value = "json", global = true)]
    pub format: OutputFormatArg,

    // === Logging Options ===
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// Where objects are read from.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Read buckets from subdirectories of this directory instead of S3
    #[arg(long, env = "IX_LOCAL_ROOT", global = true)]
    pub local_root: Option<PathBuf>,

    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "IX_S3_ENDPOINT", global = true)]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true, global = true)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true, global = true)]
    pub secret_key: Option<String>,

    /// AWS session token for temporary credentials
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true, global = true)]
    pub session_token: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Per-operation S3 timeout in seconds
    #[arg(long, default_value = "300", global = true)]
    pub timeout_secs: u64,

    /// Retries for throttled or failed S3 calls
    #[arg(long, default_value = "3", global = true)]
    pub max_retries: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remembered bucket names
    Buckets {
        #[command(subcommand)]
        command: BucketsCommand,
    },

    /// Locate and cache inventory manifests
    Manifests {
        #[command(subcommand)]
        command: ManifestsCommand,
    },

    /// Folder-grouped search for a string in object keys
    Search(SearchArgs),

    /// Total size and object count per path prefix
    PathSize(PathSizeArgs),

    /// Re-run a query and write its results as CSV
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
pub enum BucketsCommand {
    /// List remembered buckets
    List,

    /// Remember one or more buckets
    Add {
        /// Bucket names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ManifestsCommand {
    /// Find the latest manifest per source bucket and cache it
    Fetch {
        /// Inventory destination buckets
        #[arg(required = true)]
        buckets: Vec<String>,
    },

    /// Show cached manifests without contacting the store
    Cached {
        /// Inventory destination buckets
        #[arg(required = true)]
        buckets: Vec<String>,
    },

    /// Forget every cached manifest
    Clear,
}

/// Bucket and manifests a query runs over.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Inventory destination bucket holding the manifests
    #[arg(short, long)]
    pub bucket: String,

    /// Manifest key (repeatable)
    #[arg(short, long = "manifest", required = true)]
    pub manifests: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// String to look for in key segments (case-insensitive)
    pub search_string: String,
}

#[derive(Args, Debug, Clone)]
pub struct PathSizeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Number of leading path segments to group by (must be >= 1)
    #[arg(short, long, allow_negative_numbers = true)]
    pub depth: i64,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub query: ExportQuery,
}

#[derive(Subcommand, Debug)]
pub enum ExportQuery {
    /// Export search results
    Search(SearchArgs),

    /// Export path sizes
    PathSize(PathSizeArgs),
}

/// Output format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Pretty-printed JSON
    Json,
    /// Aligned text table
    Table,
}
