//! Represents a bucket row in the local store's metadata database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bucket known to the local storage service.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Bucket {
    /// Internal identifier.
    pub id: Uuid,

    /// Bucket name (S3 naming rules).
    pub name: String,

    /// Region label, informational only.
    pub region: String,

    pub created_at: DateTime<Utc>,
}
