use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// AniList anime id used to correlate SeaDex entries, AniList metadata and
/// stored snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedId(u32);

impl TrackedId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Placeholder title used when no display metadata is available.
    #[must_use]
    pub fn placeholder_title(self) -> String {
        format!("Anilist ID {}", self.0)
    }
}

impl From<u32> for TrackedId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<TrackedId> for i64 {
    fn from(id: TrackedId) -> Self {
        Self::from(id.0)
    }
}

impl fmt::Display for TrackedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
#[error("invalid tracked id: {0:?}")]
pub struct InvalidTrackedId(pub String);

impl FromStr for TrackedId {
    type Err = InvalidTrackedId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self).map_err(|_| InvalidTrackedId(s.to_owned()))
    }
}
