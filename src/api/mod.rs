//! Access to the Omeka REST API.
//!
//! # Features
//!
//! - Endpoint resolution for resource names and server-supplied browse URLs
//! - Bootstrap check distinguishing a disabled API from a missing one
//! - Lazy pagination with `page`/`key` parameters and a per-page throttle
//! - Omeka's empty-body responses normalized to empty result sets
//!
//! # Example
//!
//! ```no_run
//! use omeka_archive_core::{ApiClient, ArchiveConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArchiveConfig::new("http://example.org/omeka")?;
//! let client = ApiClient::new(&config)?;
//! client.check_api().await?;
//!
//! let mut collections = client.paginate("collections", &[])?;
//! while let Some(collection) = collections.next_record().await? {
//!     println!("{}", collection["id"]);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod paginator;
pub mod resources;

pub use client::ApiClient;
pub use error::ApiError;
pub use paginator::Paginator;
pub use resources::{ResourceDescriptor, ResourceInfo, ResourceKind};
