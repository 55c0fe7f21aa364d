//! src/services/storage_service.rs
//!
//! StorageService: a local S3-like store backed by SQLite for metadata and
//! local disk for object payloads, sharded beneath
//! `base_path/{bucket}/{shard}/{shard}/{key}`. It models storage classes and
//! tiered, time-bounded restores so the archive lifecycle can be exercised
//! without a remote service.

use crate::{
    backend::{BackendError, ByteStream, HeadOutput, ObjectBackend},
    models::{
        bucket::Bucket,
        restore::{RestoreRequest, RestoreTier},
        stored::{RestorePhase, STANDARD_CLASS, StoredObject},
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use futures::{Stream, StreamExt, pin_mut};
use md5::Context;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::{AsyncWrite, AsyncWriteExt},
};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket `{0}` not found")]
    BucketNotFound(String),
    #[error("bucket `{0}` already exists")]
    BucketAlreadyExists(String),
    #[error("bucket `{name}` invalid: {reason}")]
    InvalidBucketName { name: String, reason: String },
    #[error("object `{key}` not found in bucket `{bucket}`")]
    ObjectNotFound { bucket: String, key: String },
    #[error("invalid object key")]
    InvalidObjectKey,
    #[error("object `{key}` in bucket `{bucket}` is not in a valid state for this operation")]
    InvalidObjectState { bucket: String, key: String },
    #[error("a restore of `{key}` in bucket `{bucket}` is already in progress")]
    RestoreAlreadyInProgress { bucket: String, key: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StorageError {
    /// S3 error code for this condition, `None` for internal faults.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            StorageError::BucketNotFound(_) => Some("NoSuchBucket"),
            StorageError::BucketAlreadyExists(_) => Some("BucketAlreadyExists"),
            StorageError::InvalidBucketName { .. } => Some("InvalidBucketName"),
            StorageError::ObjectNotFound { .. } => Some("NoSuchKey"),
            StorageError::InvalidObjectKey => Some("InvalidArgument"),
            StorageError::InvalidObjectState { .. } => Some("InvalidObjectState"),
            StorageError::RestoreAlreadyInProgress { .. } => Some("RestoreAlreadyInProgress"),
            StorageError::Sqlx(_) | StorageError::Migration(_) | StorageError::Io(_) => None,
        }
    }
}

impl From<StorageError> for BackendError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err.code() {
            Some(code) => BackendError::new(code, message).with_source(err),
            None => BackendError::unclassified(message).with_source(err),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// How long restores take and how long a restore "day" lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreTimings {
    pub expedited: Duration,
    pub standard: Duration,
    pub bulk: Duration,
    /// Length of one day of restored availability.
    pub day: Duration,
}

impl Default for RestoreTimings {
    fn default() -> Self {
        Self {
            expedited: Duration::from_secs(5 * 60),
            standard: Duration::from_secs(5 * 60 * 60),
            bulk: Duration::from_secs(12 * 60 * 60),
            day: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl RestoreTimings {
    /// Restores complete as soon as they are accepted.
    pub fn immediate() -> Self {
        Self {
            expedited: Duration::ZERO,
            standard: Duration::ZERO,
            bulk: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn latency(&self, tier: RestoreTier) -> Duration {
        match tier {
            RestoreTier::Expedited => self.expedited,
            RestoreTier::Standard => self.standard,
            RestoreTier::Bulk => self.bulk,
        }
    }
}

/// StorageService provides S3-like operations over SQLite + local disk:
/// - Upload an object (writes bytes to disk and upserts metadata)
/// - Read an object (gated on its storage class and restore state)
/// - Restore an archived object for a number of days
/// - Transition an object between storage classes
/// - Delete an object (idempotent for absent keys)
///
/// It implements [`ObjectBackend`], reporting failures with S3 error codes.
#[derive(Clone)]
pub struct StorageService {
    /// Shared SQLite connection pool used for metadata operations.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where object payloads are stored.
    pub base_path: PathBuf,

    timings: RestoreTimings,
}

const MAX_OBJECT_KEY_LEN: usize = 1024;
const BUCKET_NAME_MIN_LEN: usize = 3;
const BUCKET_NAME_MAX_LEN: usize = 63;

const OBJECT_COLUMNS: &str = "id, bucket_id, key, size_bytes, etag, storage_class, last_modified, \
     restore_tier, restore_ready_at, restore_expires_at";

impl StorageService {
    /// Create a new StorageService backed by the provided SQLite pool and
    /// using `base_path` as the root directory for object payloads.
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            db,
            base_path: base_path.into(),
            timings: RestoreTimings::default(),
        }
    }

    /// Connect to `database_url`, creating the database file if needed, and
    /// apply migrations.
    pub async fn open(database_url: &str, base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let service = Self::new(Arc::new(pool), base_path);
        service.migrate().await?;
        Ok(service)
    }

    pub fn with_restore_timings(mut self, timings: RestoreTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn restore_timings(&self) -> RestoreTimings {
        self.timings
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations").run(&*self.db).await?;
        debug!("metadata schema up to date");
        Ok(())
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    fn ensure_key_safe(&self, key: &str) -> StorageResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(StorageError::InvalidObjectKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(StorageError::InvalidObjectKey);
        }
        if key.bytes().any(|b| b.is_ascii_control() || b == b'\\') {
            return Err(StorageError::InvalidObjectKey);
        }
        Ok(())
    }

    /// Validate bucket name format.
    ///
    /// Enforces S3-like naming rules:
    /// - 3–63 characters
    /// - lowercase letters, digits, dots, hyphens only
    /// - must start and end with a letter or digit
    /// - no consecutive dots or dot-hyphen pairs
    /// - must not look like an IPv4 address
    fn ensure_bucket_name_safe(&self, name: &str) -> StorageResult<()> {
        let invalid = |reason: &str| StorageError::InvalidBucketName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if !(BUCKET_NAME_MIN_LEN..=BUCKET_NAME_MAX_LEN).contains(&name.len()) {
            return Err(invalid("must be between 3 and 63 characters"));
        }
        if !name
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
        {
            return Err(invalid(
                "allowed characters are lowercase letters, digits, dots, and hyphens",
            ));
        }
        let alnum_edge = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
        if !alnum_edge(name.chars().next()) || !alnum_edge(name.chars().last()) {
            return Err(invalid("must start and end with a lowercase letter or digit"));
        }
        if name.contains("..") || name.contains("-.") || name.contains(".-") {
            return Err(invalid(
                "cannot contain consecutive dots or dot-hyphen combinations",
            ));
        }
        if is_ipv4_like(name) {
            return Err(invalid("must not be formatted like an IP address"));
        }
        Ok(())
    }

    fn bucket_root(&self, bucket_name: &str) -> PathBuf {
        self.base_path.join(bucket_name)
    }

    /// Two-level shard directories for an object key: the first two bytes of
    /// MD5(bucket/key) as lowercase hex.
    fn object_shards(bucket_name: &str, key: &str) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", bucket_name, key));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    fn object_path(&self, bucket_name: &str, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::object_shards(bucket_name, key);
        self.bucket_root(bucket_name)
            .join(shard_a)
            .join(shard_b)
            .join(key)
    }

    async fn fetch_bucket(&self, bucket: &str) -> StorageResult<Bucket> {
        self.ensure_bucket_name_safe(bucket)
            .map_err(|_| StorageError::BucketNotFound(bucket.to_string()))?;
        sqlx::query_as::<_, Bucket>(
            "SELECT id, name, region, created_at FROM buckets WHERE name = ?",
        )
        .bind(bucket)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StorageError::BucketNotFound(bucket.to_string()),
            other => StorageError::Sqlx(other),
        })
    }

    async fn fetch_object(&self, bucket: &Bucket, key: &str) -> StorageResult<StoredObject> {
        sqlx::query_as::<_, StoredObject>(&format!(
            "SELECT {OBJECT_COLUMNS} FROM objects WHERE key = ? AND bucket_id = ?"
        ))
        .bind(key)
        .bind(bucket.id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StorageError::ObjectNotFound {
                bucket: bucket.name.clone(),
                key: key.to_string(),
            },
            other => StorageError::Sqlx(other),
        })
    }

    /// Fetch object metadata.
    pub async fn get_object_metadata(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        let bucket_rec = self.fetch_bucket(bucket).await?;
        self.fetch_object(&bucket_rec, key).await
    }

    /// Stream-upload an object to disk and update metadata.
    ///
    /// - Writes bytes incrementally to a temporary file.
    /// - Computes MD5/etag and size while streaming.
    /// - Renames into the final location.
    /// - Upserts the metadata row; overwriting clears any restore.
    pub async fn upload_object_stream<S>(
        &self,
        bucket: &str,
        key: &str,
        storage_class: &str,
        stream: S,
    ) -> StorageResult<StoredObject>
    where
        S: Stream<Item = io::Result<Bytes>> + Send,
    {
        self.ensure_key_safe(key)?;
        let bucket_rec = self.fetch_bucket(bucket).await?;

        let file_path = self.object_path(&bucket_rec.name, key);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StorageError::Io(io::Error::new(
                ErrorKind::Other,
                "object path missing parent directory",
            ))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

        let (size_bytes, etag) = match write_payload(&tmp_path, stream).await {
            Ok(written) => written,
            Err(err) => {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::Io(err));
            }
        };

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }

        let stored = sqlx::query_as::<_, StoredObject>(&format!(
            r#"
            INSERT INTO objects (
                id, bucket_id, key, size_bytes, etag, storage_class, last_modified,
                restore_tier, restore_ready_at, restore_expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, NULL, NULL, NULL)
            ON CONFLICT(bucket_id, key) DO UPDATE SET
                size_bytes = excluded.size_bytes,
                etag = excluded.etag,
                storage_class = excluded.storage_class,
                last_modified = excluded.last_modified,
                restore_tier = NULL,
                restore_ready_at = NULL,
                restore_expires_at = NULL
            RETURNING {OBJECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(bucket_rec.id)
        .bind(key)
        .bind(size_bytes)
        .bind(&etag)
        .bind(storage_class)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match stored {
            Ok(obj) => {
                debug!(bucket, key, size_bytes, storage_class, "stored object");
                Ok(obj)
            }
            Err(err) => {
                let _ = fs::remove_file(&file_path).await;
                Err(StorageError::Sqlx(err))
            }
        }
    }

    /// Move an object to another storage class, dropping any restored copy.
    pub async fn transition_storage_class(
        &self,
        bucket: &str,
        key: &str,
        storage_class: &str,
    ) -> StorageResult<StoredObject> {
        let bucket_rec = self.fetch_bucket(bucket).await?;
        let object = self.fetch_object(&bucket_rec, key).await?;

        let updated = sqlx::query_as::<_, StoredObject>(&format!(
            "UPDATE objects SET storage_class = ?, restore_tier = NULL, \
             restore_ready_at = NULL, restore_expires_at = NULL \
             WHERE id = ? RETURNING {OBJECT_COLUMNS}"
        ))
        .bind(storage_class)
        .bind(object.id)
        .fetch_one(&*self.db)
        .await?;

        debug!(bucket, key, from = %object.storage_class, to = storage_class, "transitioned object");
        Ok(updated)
    }

    /// Accept a restore request for an archived object.
    ///
    /// - Standard objects are rejected with `InvalidObjectState`.
    /// - A restore still running is rejected with `RestoreAlreadyInProgress`.
    /// - A restored copy has its expiry extended from now.
    pub async fn request_restore(
        &self,
        bucket: &str,
        key: &str,
        request: RestoreRequest,
    ) -> StorageResult<StoredObject> {
        let bucket_rec = self.fetch_bucket(bucket).await?;
        let object = self.fetch_object(&bucket_rec, key).await?;

        if !object.is_archived() {
            return Err(StorageError::InvalidObjectState {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let now = Utc::now();
        let ready_at = match object.restore_phase(now) {
            RestorePhase::Ongoing => {
                return Err(StorageError::RestoreAlreadyInProgress {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
            }
            RestorePhase::Available { .. } => now,
            RestorePhase::Idle => offset(now, self.timings.latency(request.tier)),
        };
        let available_for = self
            .timings
            .day
            .checked_mul(request.days)
            .unwrap_or(Duration::MAX);
        let expires_at = offset(ready_at, available_for);

        let updated = sqlx::query_as::<_, StoredObject>(&format!(
            "UPDATE objects SET restore_tier = ?, restore_ready_at = ?, restore_expires_at = ? \
             WHERE id = ? RETURNING {OBJECT_COLUMNS}"
        ))
        .bind(request.tier.as_str())
        .bind(ready_at)
        .bind(expires_at)
        .bind(object.id)
        .fetch_one(&*self.db)
        .await?;

        debug!(
            bucket,
            key,
            tier = %request.tier,
            %ready_at,
            %expires_at,
            "restore accepted"
        );
        Ok(updated)
    }

    /// Copy an object's payload into `sink`, returning the bytes copied.
    ///
    /// Archived objects without a readable restored copy fail with
    /// `InvalidObjectState` before anything is written.
    pub async fn read_object_into(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> StorageResult<u64> {
        let bucket_rec = self.fetch_bucket(bucket).await?;
        let object = self.fetch_object(&bucket_rec, key).await?;

        if !object.is_readable(Utc::now()) {
            return Err(StorageError::InvalidObjectState {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let file_path = self.object_path(&bucket_rec.name, key);
        let mut file = File::open(&file_path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }
            } else {
                StorageError::Io(err)
            }
        })?;

        let copied = tokio::io::copy(&mut file, &mut *sink).await?;
        sink.flush().await?;
        Ok(copied)
    }

    /// Delete an object's metadata and payload.
    ///
    /// Returns `false` when the key did not exist; the bucket must exist.
    pub async fn remove_object(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        let bucket_rec = self.fetch_bucket(bucket).await?;

        // the row is only dropped once the payload is gone
        let mut tx = self.db.begin().await?;
        let result = sqlx::query("DELETE FROM objects WHERE key = ? AND bucket_id = ?")
            .bind(key)
            .bind(bucket_rec.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            debug!(bucket, key, "delete of absent key");
            return Ok(false);
        }

        let file_path = self.object_path(&bucket_rec.name, key);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed physical file {}", file_path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("file {} already missing", file_path.display());
            }
            Err(err) => {
                tx.rollback().await?;
                return Err(StorageError::Io(err));
            }
        }
        tx.commit().await?;

        if let Some(parent) = file_path.parent() {
            let bucket_root = self.bucket_root(&bucket_rec.name);
            self.prune_empty_dirs(parent, &bucket_root).await;
        }

        Ok(true)
    }

    /// Create a bucket and its directory.
    ///
    /// Returns `BucketAlreadyExists` if the name is taken.
    pub async fn create_bucket(&self, name: &str, region: &str) -> StorageResult<Bucket> {
        self.ensure_bucket_name_safe(name)?;
        fs::create_dir_all(self.bucket_root(name)).await?;

        let bucket = Bucket {
            id: Uuid::new_v4(),
            name: name.to_string(),
            region: region.to_lowercase(),
            created_at: Utc::now(),
        };

        match sqlx::query("INSERT INTO buckets (id, name, region, created_at) VALUES (?, ?, ?, ?)")
            .bind(bucket.id)
            .bind(&bucket.name)
            .bind(&bucket.region)
            .bind(bucket.created_at)
            .execute(&*self.db)
            .await
        {
            Ok(_) => Ok(bucket),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::BucketAlreadyExists(name.to_string()))
            }
            Err(err) => Err(StorageError::Sqlx(err)),
        }
    }

    /// Delete a bucket, its objects' metadata and its directory.
    pub async fn delete_bucket(&self, name: &str) -> StorageResult<()> {
        let bucket_rec = self.fetch_bucket(name).await?;

        sqlx::query("DELETE FROM objects WHERE bucket_id = ?")
            .bind(bucket_rec.id)
            .execute(&*self.db)
            .await?;
        sqlx::query("DELETE FROM buckets WHERE id = ?")
            .bind(bucket_rec.id)
            .execute(&*self.db)
            .await?;

        let bucket_path = self.bucket_root(name);
        if let Err(err) = fs::remove_dir_all(&bucket_path).await {
            if err.kind() != ErrorKind::NotFound {
                debug!(
                    "failed to remove bucket directory {} after delete: {}",
                    bucket_path.display(),
                    err
                );
            }
        }

        Ok(())
    }

    /// Remove empty directories from `start` up to, not including, `stop`.
    async fn prune_empty_dirs(&self, start: &Path, stop: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(stop) && current != stop {
            match fs::remove_dir(&current).await {
                Ok(_) => match current.parent() {
                    Some(parent) => current = parent.to_path_buf(),
                    None => break,
                },
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty
                    ) =>
                {
                    break;
                }
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl ObjectBackend for StorageService {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<HeadOutput, BackendError> {
        // HEAD responses carry no body, so S3 reports both cases as NotFound
        let object = self
            .get_object_metadata(bucket, key)
            .await
            .map_err(|err| match err {
                StorageError::BucketNotFound(_) | StorageError::ObjectNotFound { .. } => {
                    BackendError::new("NotFound", err.to_string())
                }
                other => BackendError::from(other),
            })?;

        Ok(HeadOutput {
            storage_class: Some(object.storage_class.clone()),
            restore: object.restore_header(Utc::now()),
            content_length: u64::try_from(object.size_bytes).unwrap_or_default(),
            last_modified: Some(object.last_modified),
        })
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, BackendError> {
        Ok(self.read_object_into(bucket, key, sink).await?)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ByteStream,
    ) -> Result<(), BackendError> {
        self.upload_object_stream(bucket, key, STANDARD_CLASS, body)
            .await?;
        Ok(())
    }

    async fn restore_object(
        &self,
        bucket: &str,
        key: &str,
        request: RestoreRequest,
    ) -> Result<(), BackendError> {
        self.request_restore(bucket, key, request).await?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        self.remove_object(bucket, key).await?;
        Ok(())
    }
}

/// Stream `stream` into a new file at `path`, returning its size and MD5.
async fn write_payload<S>(path: &Path, stream: S) -> io::Result<(i64, String)>
where
    S: Stream<Item = io::Result<Bytes>> + Send,
{
    let mut file = File::create(path).await?;
    let mut size_bytes: i64 = 0;
    let mut digest = Context::new();

    pin_mut!(stream);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        size_bytes += chunk.len() as i64;
        digest.consume(&chunk);
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    file.sync_all().await?;

    Ok((size_bytes, format!("{:x}", digest.compute())))
}

/// `start + by`, saturating at the latest representable instant.
fn offset(start: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(by)
        .ok()
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

/// Check if a string matches IPv4-like dotted decimal form.
fn is_ipv4_like(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 4 && parts.iter().all(|segment| segment.parse::<u8>().is_ok())
}

#[cfg(test)]
impl StorageService {
    /// A migrated service on a SQLite file inside `dir`.
    pub async fn scratch(dir: &Path) -> Self {
        let db = dir.join("meta.db");
        Self::open(&format!("sqlite://{}", db.display()), dir.join("objects"))
            .await
            .unwrap()
    }
}
