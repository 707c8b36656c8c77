//! Main execution logic for the invex CLI.

use anyhow::{Context, Result};
use ix_engine::{EngineConfig, InventoryEngine};
use ix_gateway::{LocalGateway, RetryConfig, S3Config};
use ix_service::{
    ExportRequest, FetchManifestsRequest, InventoryService, PathSizeRequest, SearchRequest,
    ServiceConfig,
};
use ix_traits::ObjectGateway;
use ix_types::{PartFailure, ScanStats};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::args::{
    BucketsCommand, Cli, Command, ConnectionArgs, ExportQuery, ManifestsCommand, PathSizeArgs,
    SearchArgs,
};
use crate::gateway::DeferredS3Gateway;
use crate::output;

/// What a query left behind for the summary on stderr.
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub stats: ScanStats,
    pub failed_parts: Vec<PartFailure>,
}

/// Execute the command with the provided arguments.
///
/// Returns scan statistics when the command ran a query, exports included.
pub async fn execute(args: Cli) -> Result<Option<QueryOutcome>> {
    let gateway = connect(&args.connection)?;
    let engine_config = EngineConfig::new()
        .with_max_concurrent_parts(args.max_concurrent_parts)
        .with_chunk_size(args.chunk_size);
    let service_config = ServiceConfig::new().with_state_dir(&args.state_dir);

    debug!(
        gateway = gateway.name(),
        state_dir = %args.state_dir.display(),
        max_concurrent_parts = engine_config.max_concurrent_parts,
        "Starting invex"
    );

    let service = InventoryService::with_json_stores(
        InventoryEngine::new(gateway, engine_config),
        &service_config,
    );
    let cancel = cancel_on_ctrl_c();
    let format = args.format;

    match args.command {
        Command::Buckets { command } => {
            let buckets = match command {
                BucketsCommand::List => service.buckets()?,
                BucketsCommand::Add { names } => service.add_buckets(&names)?,
            };
            print!("{}", with_newline(output::render_buckets(&buckets, format)?));
            Ok(None)
        }

        Command::Manifests { command } => {
            match command {
                ManifestsCommand::Fetch { buckets } => {
                    let listing = service
                        .fetch_manifests(&FetchManifestsRequest {
                            bucket_names: buckets.clone(),
                        })
                        .await?;
                    service.add_buckets(&buckets)?;
                    print!("{}", with_newline(output::render_listing(&listing, format)?));
                }
                ManifestsCommand::Cached { buckets } => {
                    let listing = service.cached_manifests(&buckets)?;
                    print!("{}", with_newline(output::render_listing(&listing, format)?));
                }
                ManifestsCommand::Clear => {
                    service.clear_cache()?;
                    info!("Manifest cache cleared");
                }
            }
            Ok(None)
        }

        Command::Search(search) => {
            let response = service.search(&search_request(search), &cancel).await?;
            print!("{}", with_newline(output::render_search(&response, format)?));
            Ok(Some(QueryOutcome {
                stats: response.report.stats,
                failed_parts: response.report.failed_parts,
            }))
        }

        Command::PathSize(paths) => {
            let report = service.path_size(&path_size_request(paths), &cancel).await?;
            print!("{}", with_newline(output::render_paths(&report, format)?));
            Ok(Some(QueryOutcome {
                stats: report.stats,
                failed_parts: report.failed_parts,
            }))
        }

        Command::Export(export) => {
            let request = match export.query {
                ExportQuery::Search(search) => ExportRequest::Search(search_request(search)),
                ExportQuery::PathSize(paths) => ExportRequest::PathSize(path_size_request(paths)),
            };
            let response = service.export_csv(&request, &cancel).await?;
            match export.output {
                Some(path) => write_file(&path, &response.csv)?,
                None => print!("{}", response.csv),
            }
            Ok(Some(QueryOutcome {
                stats: response.stats,
                failed_parts: response.failed_parts,
            }))
        }
    }
}

/// Builds the gateway: local directory when `--local-root` is set, S3 otherwise.
fn connect(args: &ConnectionArgs) -> Result<Arc<dyn ObjectGateway>> {
    if let Some(root) = &args.local_root {
        info!(root = %root.display(), "Using local filesystem gateway");
        return Ok(Arc::new(LocalGateway::new(root)?));
    }

    let mut config = S3Config::new()
        .with_timeout(args.timeout_secs)
        .with_retry(RetryConfig::new().with_max_retries(args.max_retries));

    if let Some(region) = &args.region {
        config = config.with_region(region);
    }
    if let Some(endpoint) = &args.s3_endpoint {
        config = config.with_endpoint(endpoint);
    }
    if let Some(profile) = &args.profile {
        config = config.with_profile(profile);
    }
    config.access_key = args.access_key.clone();
    config.secret_key = args.secret_key.clone();
    config.session_token = args.session_token.clone();

    config.validate()?;
    Ok(Arc::new(DeferredS3Gateway::new(config)))
}

/// Token cancelled on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });
    cancel
}

fn search_request(args: SearchArgs) -> SearchRequest {
    SearchRequest {
        bucket_name: args.target.bucket,
        manifest_keys: args.target.manifests,
        search_string: args.search_string,
    }
}

fn path_size_request(args: PathSizeArgs) -> PathSizeRequest {
    PathSizeRequest {
        bucket_name: args.target.bucket,
        manifest_keys: args.target.manifests,
        path_depth: args.depth,
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = contents.len(), "Wrote CSV export");
    Ok(())
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
