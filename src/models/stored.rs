//! Represents an object row in the local store's metadata database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Storage class written for directly readable objects.
pub const STANDARD_CLASS: &str = "STANDARD";

/// Storage class written for archived objects.
pub const GLACIER_CLASS: &str = "GLACIER";

/// Metadata for one object held by the local storage service.
///
/// The payload bytes live on disk; this row only describes them.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct StoredObject {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Foreign key linking to the parent bucket.
    pub bucket_id: Uuid,

    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Size in bytes.
    pub size_bytes: i64,

    /// MD5 of the payload.
    pub etag: Option<String>,

    /// Storage class (`STANDARD`, `GLACIER`, ...).
    pub storage_class: String,

    pub last_modified: DateTime<Utc>,

    /// Tier of the most recent restore request, if any.
    pub restore_tier: Option<String>,

    /// When the most recent restore finishes.
    pub restore_ready_at: Option<DateTime<Utc>>,

    /// When the restored copy stops being readable.
    pub restore_expires_at: Option<DateTime<Utc>>,
}

/// Where an archived object's restore stands at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestorePhase {
    Idle,
    Ongoing,
    Available { expires_at: DateTime<Utc> },
}

impl StoredObject {
    pub fn is_archived(&self) -> bool {
        self.storage_class.starts_with(GLACIER_CLASS)
    }

    /// Restore progress as of `now`. Expired copies read as idle.
    pub fn restore_phase(&self, now: DateTime<Utc>) -> RestorePhase {
        match (self.restore_ready_at, self.restore_expires_at) {
            (Some(ready), _) if now < ready => RestorePhase::Ongoing,
            (Some(_), Some(expires_at)) if now < expires_at => {
                RestorePhase::Available { expires_at }
            }
            _ => RestorePhase::Idle,
        }
    }

    /// Whether a GET may stream the payload as of `now`.
    pub fn is_readable(&self, now: DateTime<Utc>) -> bool {
        !self.is_archived() || matches!(self.restore_phase(now), RestorePhase::Available { .. })
    }

    /// The `x-amz-restore` style status string, if a restore is visible.
    pub fn restore_header(&self, now: DateTime<Utc>) -> Option<String> {
        if !self.is_archived() {
            return None;
        }
        match self.restore_phase(now) {
            RestorePhase::Idle => None,
            RestorePhase::Ongoing => Some(r#"ongoing-request="true""#.to_string()),
            RestorePhase::Available { expires_at } => Some(format!(
                r#"ongoing-request="false", expiry-date="{}""#,
                expires_at.to_rfc2822()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(class: &str) -> StoredObject {
        StoredObject {
            id: Uuid::new_v4(),
            bucket_id: Uuid::new_v4(),
            key: "k".into(),
            size_bytes: 3,
            etag: None,
            storage_class: class.into(),
            last_modified: Utc::now(),
            restore_tier: None,
            restore_ready_at: None,
            restore_expires_at: None,
        }
    }

    #[test]
    fn standard_objects_never_report_restore() {
        let mut obj = row(STANDARD_CLASS);
        let now = Utc::now();
        obj.restore_ready_at = Some(now + Duration::hours(1));
        assert!(obj.is_readable(now));
        assert_eq!(obj.restore_header(now), None);
    }

    #[test]
    fn restore_phases_follow_the_clock() {
        let now = Utc::now();
        let mut obj = row(GLACIER_CLASS);
        assert_eq!(obj.restore_phase(now), RestorePhase::Idle);
        assert!(!obj.is_readable(now));

        obj.restore_ready_at = Some(now + Duration::minutes(5));
        obj.restore_expires_at = Some(now + Duration::days(1));
        assert_eq!(obj.restore_phase(now), RestorePhase::Ongoing);
        assert_eq!(
            obj.restore_header(now).as_deref(),
            Some(r#"ongoing-request="true""#)
        );

        let later = now + Duration::minutes(10);
        assert!(obj.is_readable(later));
        let header = obj.restore_header(later).unwrap();
        assert!(header.starts_with(r#"ongoing-request="false""#));

        let expired = now + Duration::days(2);
        assert_eq!(obj.restore_phase(expired), RestorePhase::Idle);
        assert!(!obj.is_readable(expired));
    }
}
