use crate::domain::entities::ReplicaMeta;
use chrono::{DateTime, Utc};

/// Which side of a push/pull race keeps the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Local,
    Remote,
}

/// Whole-record last-write-wins. The winner replaces every field of the
/// loser, including fields the loser had changed independently.
///
/// A local row that is already `Synced` always loses: the remote version
/// arrived through the changed-since filter, so it is newer than whatever
/// was last reconciled. Only a `PendingPush` row competes on `updated_at`,
/// and an exact-timestamp tie keeps the local edit (it will overwrite the
/// remote on the device's next push).
///
/// Known limitation: timestamps are device wall clocks. Skew between
/// devices can make a genuinely later edit lose; this is accepted rather
/// than compensated (no logical or vector clocks).
pub fn resolve(local: Option<&ReplicaMeta>, remote_updated_at: DateTime<Utc>) -> Winner {
    let Some(local) = local else {
        return Winner::Remote;
    };

    if !local.sync_state.is_pending() {
        return Winner::Remote;
    }

    if remote_updated_at > local.updated_at {
        Winner::Remote
    } else {
        Winner::Local
    }
}
