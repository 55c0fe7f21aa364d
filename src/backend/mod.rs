//! The storage backend seam.
//!
//! `ArchiveManager` talks to storage only through [`ObjectBackend`]. A backend
//! reports failures as [`BackendError`]s carrying its own condition codes;
//! the backend's [`TranslationTable`] decides which of those codes mean
//! not-found, archived, and so on.

mod translation;

pub use translation::{Condition, Operation, TranslationTable};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{Stream, stream};
use std::{error::Error as StdError, io, pin::Pin};
use thiserror::Error;
use tokio::{fs::File, io::AsyncWrite};
use tokio_util::io::ReaderStream;

use crate::models::restore::RestoreRequest;

/// Request body for an upload.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Wrap an in-memory payload as an upload body.
pub fn byte_stream_from_bytes(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    Box::pin(stream::once(async move { Ok(data) }))
}

/// Stream an open file as an upload body without reading it into memory.
pub fn byte_stream_from_file(file: File) -> ByteStream {
    Box::pin(ReaderStream::new(file))
}

/// Result of a metadata probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadOutput {
    /// Backend storage class, e.g. `STANDARD` or `GLACIER`.
    pub storage_class: Option<String>,
    /// Restore status string, e.g. `ongoing-request="true"`.
    pub restore: Option<String>,
    pub content_length: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// A failure reported by a storage backend.
///
/// `code` is the backend's own condition code (`NoSuchKey`,
/// `InvalidObjectState`, ...); errors without a code never match a
/// translation table entry.
#[derive(Debug, Error)]
#[error("{}{}", .code.as_deref().map(|c| format!("{c}: ")).unwrap_or_default(), .message)]
pub struct BackendError {
    code: Option<String>,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            source: None,
        }
    }

    /// A fault with no condition code.
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for BackendError {
    fn from(err: io::Error) -> Self {
        BackendError::unclassified(err.to_string()).with_source(err)
    }
}

/// Capability set the lifecycle manager needs from a storage backend.
///
/// Implementations must be shareable across tasks; the manager holds one
/// behind an `Arc` and issues every call as an independent round-trip.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Metadata probe (HEAD).
    async fn head_object(&self, bucket: &str, key: &str) -> Result<HeadOutput, BackendError>;

    /// Stream the object into `sink`, returning the number of bytes written.
    ///
    /// A backend must refuse to read an object whose storage state forbids
    /// it before writing anything to `sink`.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, BackendError>;

    /// Create or overwrite the object with `body`.
    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream)
    -> Result<(), BackendError>;

    /// Ask for an archived object to be made readable for a while.
    async fn restore_object(
        &self,
        bucket: &str,
        key: &str,
        request: RestoreRequest,
    ) -> Result<(), BackendError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError>;

    /// How this backend's condition codes map onto archive errors.
    fn translation_table(&self) -> TranslationTable {
        TranslationTable::s3()
    }
}
