//! Shared test utilities: a scripted in-memory backend and a scratch local
//! store.
#![allow(dead_code)]

use async_trait::async_trait;
use futures::TryStreamExt;
use object_archive::{
    ArchiveConfig, ArchiveManager, BackendError, HeadOutput, ObjectBackend, RestoreRequest,
    RestoreTimings, StorageService, backend::ByteStream,
};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tempfile::TempDir;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const GOOD_BUCKET: &str = "uva-dpg3k-scratch";
pub const BAD_BUCKET: &str = "bla-bla-bla";
pub const GOOD_OBJECT: &str = "good-object";
pub const BAD_OBJECT: &str = "bad-object";

/// A manager with operational logging switched on.
pub fn manager(backend: Arc<dyn ObjectBackend>) -> ArchiveManager {
    ArchiveManager::new(
        backend,
        ArchiveConfig {
            logging: true,
            ..ArchiveConfig::default()
        },
    )
}

/// A migrated local store in a fresh temp directory, with `GOOD_BUCKET`
/// already created.
pub async fn local_store(timings: RestoreTimings) -> (StorageService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("meta.db");
    let store = StorageService::open(
        &format!("sqlite://{}", db.display()),
        temp_dir.path().join("objects"),
    )
    .await
    .unwrap()
    .with_restore_timings(timings);
    store.create_bucket(GOOD_BUCKET, "local").await.unwrap();
    (store, temp_dir)
}

#[derive(Debug, Clone)]
pub struct FakeObject {
    pub data: Vec<u8>,
    pub storage_class: String,
    pub restore: Option<String>,
    /// Content length reported by HEAD when it should disagree with `data`.
    pub reported_size: Option<u64>,
}

impl FakeObject {
    pub fn standard(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            storage_class: "STANDARD".into(),
            restore: None,
            reported_size: None,
        }
    }

    pub fn glacier(data: &[u8], restore: Option<&str>) -> Self {
        Self {
            data: data.to_vec(),
            storage_class: "GLACIER".into(),
            restore: restore.map(str::to_string),
            reported_size: None,
        }
    }

    fn readable(&self) -> bool {
        !self.storage_class.starts_with("GLACIER")
            || self
                .restore
                .as_deref()
                .is_some_and(|r| r.starts_with(r#"ongoing-request="false""#))
    }
}

#[derive(Default)]
struct FakeState {
    buckets: HashSet<String>,
    objects: HashMap<(String, String), FakeObject>,
    restores: Vec<RestoreRequest>,
    fail_next: Option<BackendError>,
}

/// In-memory backend speaking S3 error codes, counting every call.
#[derive(Default)]
pub struct FakeBackend {
    calls: AtomicUsize,
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str) -> Self {
        self.state.lock().unwrap().buckets.insert(bucket.to_string());
        self
    }

    pub fn with_object(self, bucket: &str, key: &str, object: FakeObject) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.buckets.insert(bucket.to_string());
            state
                .objects
                .insert((bucket.to_string(), key.to_string()), object);
        }
        self
    }

    /// Make the next backend call fail with `err`.
    pub fn fail_next(&self, err: BackendError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn restores(&self) -> Vec<RestoreRequest> {
        self.state.lock().unwrap().restores.clone()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<FakeObject> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    fn enter(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.state.lock().unwrap().fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn lookup(&self, bucket: &str, key: &str) -> Result<FakeObject, BackendError> {
        let state = self.state.lock().unwrap();
        if !state.buckets.contains(bucket) {
            return Err(BackendError::new("NoSuchBucket", bucket));
        }
        state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| BackendError::new("NoSuchKey", key))
    }
}

#[async_trait]
impl ObjectBackend for FakeBackend {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<HeadOutput, BackendError> {
        self.enter()?;
        let object = self
            .lookup(bucket, key)
            .map_err(|err| BackendError::new("NotFound", err.message()))?;
        Ok(HeadOutput {
            storage_class: Some(object.storage_class.clone()),
            restore: object.restore.clone(),
            content_length: object.reported_size.unwrap_or(object.data.len() as u64),
            last_modified: None,
        })
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, BackendError> {
        self.enter()?;
        let object = self.lookup(bucket, key)?;
        if !object.readable() {
            return Err(BackendError::new("InvalidObjectState", key));
        }
        sink.write_all(&object.data).await?;
        Ok(object.data.len() as u64)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ByteStream,
    ) -> Result<(), BackendError> {
        self.enter()?;
        if !self.state.lock().unwrap().buckets.contains(bucket) {
            return Err(BackendError::new("NoSuchBucket", bucket));
        }
        let chunks: Vec<_> = body.try_collect().await?;
        let data = chunks.concat();
        self.state
            .lock()
            .unwrap()
            .objects
            .insert((bucket.to_string(), key.to_string()), FakeObject::standard(&data));
        Ok(())
    }

    async fn restore_object(
        &self,
        bucket: &str,
        key: &str,
        request: RestoreRequest,
    ) -> Result<(), BackendError> {
        self.enter()?;
        let object = self.lookup(bucket, key)?;
        if !object.storage_class.starts_with("GLACIER") {
            return Err(BackendError::new("InvalidObjectState", key));
        }
        let mut state = self.state.lock().unwrap();
        state.restores.push(request);
        if let Some(stored) = state
            .objects
            .get_mut(&(bucket.to_string(), key.to_string()))
        {
            stored.restore = Some(r#"ongoing-request="true""#.into());
        }
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        self.enter()?;
        let mut state = self.state.lock().unwrap();
        if !state.buckets.contains(bucket) {
            return Err(BackendError::new("NoSuchBucket", bucket));
        }
        state.objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}
