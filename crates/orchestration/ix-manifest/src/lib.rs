//! ix-manifest - inventory manifest discovery and parsing.
//!
//! - [`locate_latest_manifests`] lists destination buckets and keeps the
//!   newest `manifest.json` per source bucket
//! - [`read_manifest`] fetches one manifest and expands it into part-files
//!   tagged with the manifest's source
//!
//! # Example
//!
//! ```ignore
//! use ix_manifest::{locate_latest_manifests, read_manifest};
//!
//! let located = locate_latest_manifests(&gateway, &["inventory-dest".to_string()]).await?;
//! for manifests in located.values() {
//!     for m in manifests {
//!         let manifest = read_manifest(&gateway, &m.destination_bucket, &m.key).await?;
//!         println!("{} -> {} part-files", m.source_bucket, manifest.part_count());
//!     }
//! }
//! ```

mod locator;
mod reader;

pub use locator::{locate_latest_manifests, source_bucket_of};
pub use reader::{parse_manifest, read_manifest, source_tag};
