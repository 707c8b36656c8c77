//! Core types for invex.
//!
//! This crate provides the data model shared by every stage of the pipeline:
//! - [`ObjectEntry`] - One listed object (key + modification time)
//! - [`LocatedManifest`] / [`Manifest`] / [`PartFileDescriptor`] - Inventory snapshots
//! - [`FolderMatch`] / [`PathBucket`] - Final aggregate records
//! - [`SearchReport`] / [`PathSizeReport`] / [`ScanStats`] - Query results
//! - [`ManifestCacheEntry`] - Remembered manifest per (destination, source) pair

pub mod cache;
pub mod manifest;
pub mod object;
pub mod summary;

pub use cache::*;
pub use manifest::*;
pub use object::*;
pub use summary::*;
