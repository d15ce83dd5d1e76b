//! Omeka Archive Core Library
//!
//! This library walks the REST API of an Omeka site and writes every
//! collection, item, file record and binary asset to a directory tree that
//! mirrors the API hierarchy.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - HTTP access, bootstrap check and lazy pagination
//! - [`layout`] - Deterministic on-disk paths for every archived node
//! - [`persist`] - JSON and streamed binary writes
//! - [`archive`] - The traversal that ties the above together
//! - [`config`] - Immutable run configuration
//! - [`record`] - Typed access to the few fields read from API payloads
//! - [`throttle`] - Fixed inter-request delay

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod archive;
pub mod config;
mod constants;
pub mod layout;
pub mod persist;
pub mod record;
pub mod throttle;
mod user_agent;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, Paginator, ResourceDescriptor};
pub use archive::{ArchiveError, ArchiveProgress, ArchiveStats, Archiver};
pub use config::{ArchiveConfig, ConfigError, DEFAULT_EXCLUDED_RESOURCES, default_archive_dir};
pub use constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};
pub use layout::{ArchiveLayout, ItemScope, build_path};
pub use persist::{PersistError, Persister};
pub use record::RecordError;
pub use throttle::Throttle;
