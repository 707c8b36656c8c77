//! ix-engine - query execution for invex.
//!
//! [`InventoryEngine`] expands manifests into part-files and drives a
//! [`FanOut`] over them with either the search or the path-depth aggregator.
//! Part-files are processed on separate tasks, at most
//! [`EngineConfig::max_concurrent_parts`] at a time, and their partials are
//! merged once all of them have finished.
//!
//! # Example
//!
//! ```ignore
//! use ix_engine::{EngineConfig, InventoryEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = InventoryEngine::new(gateway, EngineConfig::default());
//! let report = engine
//!     .search("inventory-dest", &manifest_keys, "logs", &CancellationToken::new())
//!     .await?;
//!
//! for folder in &report.results {
//!     println!("{} {} bytes in {} files", folder.folder_path, folder.total_size, folder.file_count);
//! }
//! ```

mod config;
mod engine;
mod fanout;

pub use config::EngineConfig;
pub use engine::InventoryEngine;
pub use fanout::{FanOut, FanOutReport, PartTask};
