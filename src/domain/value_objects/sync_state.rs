use serde::{Deserialize, Serialize};
use std::fmt;

/// Local-only replication state of a row. Never transmitted to the remote
/// store; wire payloads are serialized with this field skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// The row matches what the remote store last acknowledged.
    Synced,
    /// The row has local edits that have not been pushed yet.
    PendingPush,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Synced => "synced",
            SyncState::PendingPush => "pending_push",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SyncState::PendingPush)
    }
}

impl Default for SyncState {
    fn default() -> Self {
        SyncState::PendingPush
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SyncState {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "synced" => Ok(SyncState::Synced),
            "pending_push" => Ok(SyncState::PendingPush),
            other => Err(format!("unknown sync state: {other}")),
        }
    }
}
