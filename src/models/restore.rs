//! Restore request parameters for archived objects.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::ArchiveError;

/// Retrieval speed for a restore, trading cost against latency.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RestoreTier {
    /// Fastest and most expensive; completes in minutes.
    Expedited,
    /// Completes in hours.
    Standard,
    /// Cheapest; may take up to half a day.
    Bulk,
}

impl RestoreTier {
    /// Name used on the wire by S3-like backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreTier::Expedited => "Expedited",
            RestoreTier::Standard => "Standard",
            RestoreTier::Bulk => "Bulk",
        }
    }
}

impl fmt::Display for RestoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestoreTier {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expedited" => Ok(RestoreTier::Expedited),
            "standard" => Ok(RestoreTier::Standard),
            "bulk" => Ok(RestoreTier::Bulk),
            _ => Err(ArchiveError::BadParameter(format!(
                "unknown restore tier `{}`",
                s
            ))),
        }
    }
}

/// What a backend receives when asked to restore an object.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestoreRequest {
    pub tier: RestoreTier,

    /// How long the restored copy stays readable.
    pub days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tiers_case_insensitively() {
        assert_eq!("Expedited".parse::<RestoreTier>().unwrap(), RestoreTier::Expedited);
        assert_eq!("standard".parse::<RestoreTier>().unwrap(), RestoreTier::Standard);
        assert_eq!(" BULK ".parse::<RestoreTier>().unwrap(), RestoreTier::Bulk);
    }

    #[test]
    fn rejects_unknown_tier() {
        let err = "glacial".parse::<RestoreTier>().unwrap_err();
        assert!(matches!(err, ArchiveError::BadParameter(_)));
    }

    #[test]
    fn wire_names_round_trip_through_display() {
        for tier in [RestoreTier::Expedited, RestoreTier::Standard, RestoreTier::Bulk] {
            assert_eq!(tier.to_string().parse::<RestoreTier>().unwrap(), tier);
        }
    }
}
