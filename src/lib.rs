//! Object storage access with archive-tier (glacier) awareness.
//!
//! [`ArchiveManager`] exposes stat/get/put/restore/delete over any
//! [`ObjectBackend`], classifying backend responses into a cold-tier state
//! model: archived objects cannot be read until a restore has completed, and
//! completion is only ever observed through [`ArchiveManager::stat`].
//!
//! [`StorageService`] is a local SQLite + disk backend that models storage
//! classes and tiered restores.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use object_archive::{ArchiveConfig, ArchiveManager, ObjectDescriptor, RestoreTier, StorageService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StorageService::open("sqlite://./meta.db", "./objects").await?;
//! let manager = ArchiveManager::new(Arc::new(store), ArchiveConfig::default());
//!
//! let obj = ObjectDescriptor::new("my-bucket", "reports/2024.csv");
//! let stat = manager.stat(&obj).await?;
//! if stat.is_archived() && !stat.is_readable() {
//!     manager.restore_object(&obj, RestoreTier::Bulk, 7).await?;
//! } else {
//!     let bytes = manager.get_to_buffer(&stat).await?;
//!     println!("{} bytes", bytes.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use backend::{BackendError, HeadOutput, ObjectBackend, TranslationTable};
pub use config::ArchiveConfig;
pub use errors::{ArchiveError, ArchiveResult};
pub use models::{
    object::{ObjectDescriptor, RestoreState, StorageTier},
    restore::{RestoreRequest, RestoreTier},
};
pub use services::{
    archive_manager::ArchiveManager,
    storage_service::{RestoreTimings, StorageError, StorageService},
};
