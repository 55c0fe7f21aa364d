//! Describes a single object (bucket + key) and whatever is known about it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress of a restore request against an archived object.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestoreState {
    /// No restore requested, or the restored copy has expired.
    None,
    /// A restore has been accepted by the backend and is still running.
    InProgress,
    /// A temporary readable copy exists.
    Complete,
}

/// Storage class of an object as seen by the lifecycle manager.
///
/// Restore progress only exists for archived objects, so a standard object
/// cannot carry a restore state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "tier", content = "restore_state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageTier {
    /// Directly readable.
    Standard,
    /// Cold tier; must be restored before it can be read.
    Archived(RestoreState),
}

impl StorageTier {
    /// Restore state, `RestoreState::None` for standard objects.
    pub fn restore_state(&self) -> RestoreState {
        match self {
            StorageTier::Standard => RestoreState::None,
            StorageTier::Archived(state) => *state,
        }
    }
}

/// Identity of one stored object plus any metadata learned from a stat.
///
/// Descriptors are values: `ArchiveManager::stat` returns a new, populated
/// descriptor and leaves the request descriptor untouched.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Name of the containing bucket.
    bucket: String,

    /// Object key within the bucket.
    key: String,

    /// Size in bytes, `None` until known.
    size: Option<u64>,

    /// When the object was last written, populated by a stat.
    last_modified: Option<DateTime<Utc>>,

    /// Storage class and restore progress, populated by a stat.
    tier: Option<StorageTier>,
}

impl ObjectDescriptor {
    /// Create a request descriptor. Size and tier are unknown.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size: None,
            last_modified: None,
            tier: None,
        }
    }

    pub(crate) fn populated(
        bucket: &str,
        key: &str,
        size: u64,
        last_modified: Option<DateTime<Utc>>,
        tier: StorageTier,
    ) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size: Some(size),
            last_modified,
            tier: Some(tier),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn tier(&self) -> Option<StorageTier> {
        self.tier
    }

    /// Restore state, `None` when the descriptor has not been stat'ed.
    pub fn restore_state(&self) -> Option<RestoreState> {
        self.tier.map(|tier| tier.restore_state())
    }

    pub fn is_archived(&self) -> bool {
        matches!(self.tier, Some(StorageTier::Archived(_)))
    }

    pub fn is_restoring(&self) -> bool {
        self.tier == Some(StorageTier::Archived(RestoreState::InProgress))
    }

    pub fn is_restored(&self) -> bool {
        self.tier == Some(StorageTier::Archived(RestoreState::Complete))
    }

    /// Whether the last stat saw the object in a directly readable state.
    ///
    /// This is a snapshot; the backend may have moved on since.
    pub fn is_readable(&self) -> bool {
        matches!(
            self.tier,
            Some(StorageTier::Standard) | Some(StorageTier::Archived(RestoreState::Complete))
        )
    }

    /// Both bucket and key are present.
    pub(crate) fn is_addressable(&self) -> bool {
        !self.bucket.is_empty() && !self.key.is_empty()
    }

    /// `s3://bucket/key`
    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
