//! Error taxonomy returned by the archive lifecycle manager.

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::backend::BackendError;

/// Everything an `ArchiveManager` operation can fail with.
///
/// Backend faults that the translation table does not recognise are carried
/// as-is in `Backend`; nothing here is retried.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Malformed request: empty bucket/key/path, unknown tier, zero days.
    #[error("bad parameter: {0}")]
    BadParameter(String),

    #[error("the specified bucket or key does not exist (s3://{bucket}/{key})")]
    NotFound { bucket: String, key: String },

    /// Archived and not currently readable; restore it first.
    #[error("the specified object is archived in glacier (s3://{bucket}/{key})")]
    ObjectInGlacier { bucket: String, key: String },

    #[error("the specified object cannot be restored (s3://{bucket}/{key})")]
    CannotRestore { bucket: String, key: String },

    #[error("download failure. expected {expected} bytes, received {received} bytes")]
    SizeMismatch { expected: u64, received: u64 },

    #[error("local file `{}` does not exist", .0.display())]
    LocalFileNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ArchiveError {
    /// True for the remote not-found condition (not `LocalFileNotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArchiveError::NotFound { .. })
    }

    pub fn is_in_glacier(&self) -> bool {
        matches!(self, ArchiveError::ObjectInGlacier { .. })
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
