//! Rendering of command results to stdout.

use anyhow::Result;
use ix_cli_common::{Table, format_bytes, format_number};
use ix_service::{ManifestListing, PathSizeResponse, SearchResponse};
use ix_types::ScanStats;
use serde::Serialize;

use crate::args::OutputFormatArg;

/// Pretty JSON of any response.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_buckets(buckets: &[String], format: OutputFormatArg) -> Result<String> {
    match format {
        OutputFormatArg::Json => to_json(&buckets),
        OutputFormatArg::Table => {
            let mut table = Table::new(&["Bucket"]);
            for bucket in buckets {
                table.push_row(vec![bucket.clone()]);
            }
            Ok(table.render())
        }
    }
}

pub fn render_listing(listing: &ManifestListing, format: OutputFormatArg) -> Result<String> {
    match format {
        OutputFormatArg::Json => to_json(listing),
        OutputFormatArg::Table => {
            let mut table = Table::new(&["Bucket", "Source", "Added", "Manifest"]);
            for (bucket, manifests) in listing {
                for manifest in manifests {
                    table.push_row(vec![
                        bucket.clone(),
                        manifest.source_bucket.clone(),
                        manifest.added_date.clone(),
                        manifest.key.clone(),
                    ]);
                }
            }
            Ok(table.render())
        }
    }
}

pub fn render_search(response: &SearchResponse, format: OutputFormatArg) -> Result<String> {
    match format {
        OutputFormatArg::Json => to_json(response),
        OutputFormatArg::Table => {
            let report = &response.report;
            let mut table = Table::new(&["Folder", "Source", "Files", "Size"])
                .align_right(2)
                .align_right(3);
            for folder in &report.results {
                table.push_row(vec![
                    folder.folder_path.clone(),
                    folder.source.clone(),
                    format_number(folder.file_count),
                    format_bytes(folder.total_size),
                ]);
            }

            let mut out = table.render();
            out.push_str(&format!(
                "\n{} folders, {} files, {}\n",
                format_number(report.total_folders as u64),
                format_number(report.total_files()),
                format_bytes(report.total_size)
            ));
            Ok(out)
        }
    }
}

pub fn render_paths(report: &PathSizeResponse, format: OutputFormatArg) -> Result<String> {
    match format {
        OutputFormatArg::Json => to_json(report),
        OutputFormatArg::Table => {
            let mut table = Table::new(&["Path", "Source", "Kind", "Objects", "Size"])
                .align_right(3)
                .align_right(4);
            for bucket in &report.results {
                table.push_row(vec![
                    bucket.path.clone(),
                    bucket.source.clone(),
                    if bucket.is_folder { "folder" } else { "object" }.to_string(),
                    format_number(bucket.object_count),
                    format_bytes(bucket.total_size),
                ]);
            }

            let mut out = table.render();
            out.push_str(&format!(
                "\n{} paths, {}\n",
                format_number(report.total_paths as u64),
                format_bytes(report.total_size)
            ));
            Ok(out)
        }
    }
}

/// Scan summary written to stderr after a query.
pub fn print_stats(stats: &ScanStats) {
    eprintln!();
    eprintln!("Scan completed:");
    eprintln!("  Part-files:   {}", format_number(stats.parts_total));
    eprintln!("  Succeeded:    {}", format_number(stats.parts_succeeded));
    eprintln!("  Failed:       {}", format_number(stats.parts_failed));
    eprintln!("  Chunks:       {}", format_number(stats.chunks_scanned));
    eprintln!("  Rows:         {}", format_number(stats.rows_scanned));
    eprintln!("  Duration:     {:.2}s", stats.duration.as_secs_f64());

    if let Some(rps) = stats.rows_per_second() {
        eprintln!("  Throughput:   {} rows/sec", format_number(rps as u64));
    }
}
