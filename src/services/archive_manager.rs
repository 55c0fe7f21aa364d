//! src/services/archive_manager.rs
//!
//! ArchiveManager: classifies backend responses into the cold-tier state
//! model and gates reads on it. The manager keeps no state between calls:
//! every tier/restore transition is owned by the backend and only observed
//! through `stat`.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use futures::TryStreamExt;
use tokio::{
    fs::{self, File},
    io::{self, AsyncWriteExt},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    backend::{
        BackendError, ByteStream, Condition, ObjectBackend, Operation, TranslationTable,
        byte_stream_from_bytes, byte_stream_from_file,
    },
    config::ArchiveConfig,
    errors::{ArchiveError, ArchiveResult},
    models::{
        object::{ObjectDescriptor, RestoreState, StorageTier},
        restore::{RestoreRequest, RestoreTier},
    },
};

/// Storage classes starting with this marker are archived.
pub const ARCHIVE_CLASS_PREFIX: &str = "GLACIER";

const RESTORE_ONGOING: &str = r#"ongoing-request="true""#;
const RESTORE_FINISHED: &str = r#"ongoing-request="false""#;

/// Upper bound on how much buffer `get_to_buffer` reserves up front from a
/// size reported by the backend.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Get/put/stat/restore/delete over an injected storage backend.
///
/// Cheap to clone; clones share the backend handle.
#[derive(Clone)]
pub struct ArchiveManager {
    backend: Arc<dyn ObjectBackend>,
    translation: Arc<TranslationTable>,
    config: ArchiveConfig,
}

impl ArchiveManager {
    /// Use `backend` with the translation table it advertises.
    pub fn new(backend: Arc<dyn ObjectBackend>, config: ArchiveConfig) -> Self {
        let translation = Arc::new(backend.translation_table());
        Self {
            backend,
            translation,
            config,
        }
    }

    /// Replace the backend's own translation table.
    pub fn with_translation_table(mut self, table: TranslationTable) -> Self {
        self.translation = Arc::new(table);
        self
    }

    /// Probe the object and return a populated copy of `obj`.
    pub async fn stat(&self, obj: &ObjectDescriptor) -> ArchiveResult<ObjectDescriptor> {
        self.ensure_addressable(obj)?;

        let head = self
            .backend
            .head_object(obj.bucket(), obj.key())
            .await
            .map_err(|err| self.translate(Operation::Head, obj, err))?;

        let tier = classify_tier(head.storage_class.as_deref(), head.restore.as_deref());
        debug!(object = %obj.uri(), ?tier, size = head.content_length, "stat");

        Ok(ObjectDescriptor::populated(
            obj.bucket(),
            obj.key(),
            head.content_length,
            head.last_modified,
            tier,
        ))
    }

    /// Download the object into a local file, returning the bytes written.
    ///
    /// The size check uses whatever size `obj` already carries; no stat is
    /// issued. The payload lands in a temporary file next to `location` and
    /// only replaces `location` once it is complete, so a refused or failed
    /// download leaves any existing file untouched.
    pub async fn get_to_file(
        &self,
        obj: &ObjectDescriptor,
        location: impl AsRef<Path>,
    ) -> ArchiveResult<u64> {
        let location = location.as_ref();
        self.ensure_addressable(obj)?;
        if location.as_os_str().is_empty() {
            return Err(ArchiveError::BadParameter(
                "destination path is empty".into(),
            ));
        }

        let source = obj.uri();
        if self.config.logging {
            info!("get {} to {}", source, location.display());
        }

        let staging = staging_path(location);
        let mut file = File::create(&staging).await?;

        let start = Instant::now();
        let result = self
            .backend
            .get_object(obj.bucket(), obj.key(), &mut file)
            .await;
        let received = match result {
            Ok(received) => received,
            Err(err) => {
                drop(file);
                discard_file(&staging).await;
                return Err(self.translate(Operation::Get, obj, err));
            }
        };

        if let Err(err) = file.flush().await {
            drop(file);
            discard_file(&staging).await;
            return Err(err.into());
        }
        drop(file);

        // a download that runs out of space is not always reported as an
        // error, so the byte count is checked against the known size
        if let Some(expected) = obj.size() {
            if expected != received {
                discard_file(&staging).await;
                if self.config.logging {
                    error!(
                        "get {}: expected {} bytes, received {} bytes",
                        source, expected, received
                    );
                }
                return Err(ArchiveError::SizeMismatch { expected, received });
            }
        }

        if let Err(err) = fs::rename(&staging, location).await {
            discard_file(&staging).await;
            return Err(err.into());
        }

        let elapsed = start.elapsed();
        if self.config.logging {
            info!(
                "get of {} complete in {:.2} seconds ({} bytes, {:.2} bytes/sec)",
                source,
                elapsed.as_secs_f64(),
                received,
                throughput(received, elapsed)
            );
        }
        Ok(received)
    }

    /// Download the object into memory.
    ///
    /// Stats first when `obj` carries no size. A size mismatch is only logged
    /// unless `strict_buffer_size` is configured.
    pub async fn get_to_buffer(&self, obj: &ObjectDescriptor) -> ArchiveResult<Vec<u8>> {
        self.ensure_addressable(obj)?;

        let expected = match obj.size() {
            Some(size) => size,
            None => self.stat(obj).await?.size().unwrap_or_default(),
        };

        let source = obj.uri();
        if self.config.logging {
            info!("get from {} ({} bytes)", source, expected);
        }

        let start = Instant::now();
        let mut buffer = Vec::with_capacity(expected.min(MAX_PREALLOCATION) as usize);
        let received = self
            .backend
            .get_object(obj.bucket(), obj.key(), &mut buffer)
            .await
            .map_err(|err| self.translate(Operation::Get, obj, err))?;

        if expected != received {
            if self.config.strict_buffer_size {
                return Err(ArchiveError::SizeMismatch { expected, received });
            }
            if self.config.logging {
                warn!(
                    "get {}... expected {} bytes, received {} bytes",
                    source, expected, received
                );
            }
        }

        if self.config.logging {
            info!(
                "get of {} complete in {:.2} seconds",
                source,
                start.elapsed().as_secs_f64()
            );
        }
        Ok(buffer)
    }

    /// Upload a local file, streaming it to the backend.
    pub async fn put_from_file(
        &self,
        obj: &ObjectDescriptor,
        location: impl AsRef<Path>,
    ) -> ArchiveResult<()> {
        let location = location.as_ref();
        self.ensure_addressable(obj)?;
        if location.as_os_str().is_empty() {
            return Err(ArchiveError::BadParameter("source path is empty".into()));
        }

        let destination = obj.uri();
        if self.config.logging {
            info!("put from {} to {}", location.display(), destination);
        }

        let file = match File::open(location).await {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::LocalFileNotFound(location.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };
        let size = file.metadata().await?.len();

        // read failures on the local side are kept apart from backend faults
        let local_fault: Arc<Mutex<Option<io::Error>>> = Arc::default();
        let slot = Arc::clone(&local_fault);
        let body: ByteStream = Box::pin(byte_stream_from_file(file).map_err(move |err| {
            let echoed = io::Error::new(err.kind(), err.to_string());
            if let Ok(mut slot) = slot.lock() {
                if slot.is_none() {
                    *slot = Some(err);
                }
            }
            echoed
        }));

        let start = Instant::now();
        let result = self.backend.put_object(obj.bucket(), obj.key(), body).await;
        let local = local_fault.lock().ok().and_then(|mut slot| slot.take());
        if let Some(err) = local {
            if self.config.logging {
                error!("put from {}: {}", location.display(), err);
            }
            return Err(ArchiveError::Io(err));
        }
        if let Err(err) = result {
            self.settle(Operation::Put, obj, err)?;
        }

        let elapsed = start.elapsed();
        if self.config.logging {
            info!(
                "put {} complete in {:.2} seconds ({} bytes, {:.2} bytes/sec)",
                destination,
                elapsed.as_secs_f64(),
                size,
                throughput(size, elapsed)
            );
        }
        Ok(())
    }

    /// Upload an in-memory payload.
    pub async fn put_from_buffer(&self, obj: &ObjectDescriptor, data: &[u8]) -> ArchiveResult<()> {
        self.ensure_addressable(obj)?;

        let destination = obj.uri();
        if self.config.logging {
            info!("put to {} ({} bytes)", destination, data.len());
        }

        let start = Instant::now();
        if let Err(err) = self
            .backend
            .put_object(
                obj.bucket(),
                obj.key(),
                byte_stream_from_bytes(data.to_vec()),
            )
            .await
        {
            self.settle(Operation::Put, obj, err)?;
        }

        if self.config.logging {
            info!(
                "put of {} complete in {:.2} seconds",
                destination,
                start.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }

    /// Start restoring an archived object for `days` days.
    ///
    /// Returns once the backend has accepted the request; completion shows up
    /// in a later `stat`.
    pub async fn restore_object(
        &self,
        obj: &ObjectDescriptor,
        tier: RestoreTier,
        days: u32,
    ) -> ArchiveResult<()> {
        self.ensure_addressable(obj)?;
        if days == 0 {
            return Err(ArchiveError::BadParameter(
                "restore days must be at least 1".into(),
            ));
        }

        if self.config.logging {
            info!(
                "restoring: {} tier: {}, for {} days",
                obj.uri(),
                tier,
                days
            );
        }

        if let Err(err) = self
            .backend
            .restore_object(obj.bucket(), obj.key(), RestoreRequest { tier, days })
            .await
        {
            self.settle(Operation::Restore, obj, err)?;
        }
        Ok(())
    }

    /// `restore_object` with the tier given by name.
    pub async fn restore_object_named(
        &self,
        obj: &ObjectDescriptor,
        tier: &str,
        days: u32,
    ) -> ArchiveResult<()> {
        self.ensure_addressable(obj)?;
        let tier = tier.parse::<RestoreTier>()?;
        self.restore_object(obj, tier, days).await
    }

    /// Remove the object. An absent key is not an error; an absent bucket is.
    pub async fn delete_object(&self, obj: &ObjectDescriptor) -> ArchiveResult<()> {
        self.ensure_addressable(obj)?;

        if self.config.logging {
            info!("deleting {}", obj.uri());
        }

        let start = Instant::now();
        if let Err(err) = self.backend.delete_object(obj.bucket(), obj.key()).await {
            self.settle(Operation::Delete, obj, err)?;
        }

        if self.config.logging {
            info!(
                "delete of {} complete in {:.2} seconds",
                obj.uri(),
                start.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }

    fn ensure_addressable(&self, obj: &ObjectDescriptor) -> ArchiveResult<()> {
        if obj.is_addressable() {
            Ok(())
        } else {
            Err(ArchiveError::BadParameter(
                "bucket and key must both be non-empty".into(),
            ))
        }
    }

    /// Map a backend failure onto the archive taxonomy.
    fn translate(&self, operation: Operation, obj: &ObjectDescriptor, err: BackendError) -> ArchiveError {
        let bucket = obj.bucket().to_string();
        let key = obj.key().to_string();
        match self.translation.classify(operation, &err) {
            Some(Condition::NotFound) => ArchiveError::NotFound { bucket, key },
            Some(Condition::ObjectInGlacier) => ArchiveError::ObjectInGlacier { bucket, key },
            Some(Condition::CannotRestore) => ArchiveError::CannotRestore { bucket, key },
            Some(Condition::Ignore) | None => {
                if self.config.logging {
                    error!("{:?} {}: {}", operation, obj.uri(), err);
                }
                ArchiveError::Backend(err)
            }
        }
    }

    /// Like `translate`, but honours `Condition::Ignore` for calls with no
    /// result value.
    fn settle(&self, operation: Operation, obj: &ObjectDescriptor, err: BackendError) -> ArchiveResult<()> {
        if self.translation.classify(operation, &err) == Some(Condition::Ignore) {
            debug!(object = %obj.uri(), code = ?err.code(), "ignored {:?} condition", operation);
            return Ok(());
        }
        Err(self.translate(operation, obj, err))
    }
}

/// Classify a backend storage class and restore status.
///
/// A restore status on a non-archived object is ignored.
pub fn classify_tier(storage_class: Option<&str>, restore: Option<&str>) -> StorageTier {
    let archived = storage_class.is_some_and(|class| class.starts_with(ARCHIVE_CLASS_PREFIX));
    if !archived {
        return StorageTier::Standard;
    }

    let state = match restore {
        Some(status) if status.starts_with(RESTORE_ONGOING) => RestoreState::InProgress,
        Some(status) if status.starts_with(RESTORE_FINISHED) => RestoreState::Complete,
        _ => RestoreState::None,
    };
    StorageTier::Archived(state)
}

/// Hidden sibling of `location` that a download is written to first.
fn staging_path(location: &Path) -> PathBuf {
    let name = format!(".tmp-{}", Uuid::new_v4());
    match location.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

async fn discard_file(location: &Path) {
    if let Err(err) = fs::remove_file(location).await {
        if err.kind() != io::ErrorKind::NotFound {
            debug!("failed to remove {}: {}", location.display(), err);
        }
    }
}

fn throughput(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { bytes as f64 / secs } else { bytes as f64 }
}
