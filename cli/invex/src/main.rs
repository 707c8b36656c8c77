//! invex CLI
//!
//! Search and size S3 inventory reports.

use clap::Parser;
use ix_error::{IxError, classify_error};
use ix_service::ErrorResponse;

mod args;
mod gateway;
mod output;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging (to stderr, so stdout is clean for results)
    ix_cli_common::init_logging(args.log_level)?;

    let outcome = match run::execute(args).await {
        Ok(outcome) => outcome,
        Err(e) => match e.downcast_ref::<IxError>() {
            Some(error) => {
                let response = ErrorResponse::from(error);
                eprintln!("Error: {}", response.error);
                std::process::exit(exit_code(error));
            }
            None => return Err(e),
        },
    };

    let Some(outcome) = outcome else {
        return Ok(());
    };

    // Report results to stderr
    output::print_stats(&outcome.stats);

    if !outcome.failed_parts.is_empty() {
        for failure in &outcome.failed_parts {
            eprintln!("  Failed part-file {}: {}", failure.key, failure.error);
        }
        std::process::exit(4); // Partial result
    }

    Ok(())
}

/// Process exit code for a failed command.
fn exit_code(error: &IxError) -> i32 {
    match classify_error(error).status_code() {
        400 => 2,
        499 => 130,
        _ => 1,
    }
}
