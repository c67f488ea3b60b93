use crate::domain::value_objects::SyncState;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The six replicated tables, in dependency order. Pushing and pulling in
/// this order guarantees a parent row always lands before its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Business,
    Membership,
    StaffProfile,
    Shift,
    TimeEntry,
    TimeOffRequest,
}

impl EntityKind {
    pub const SYNC_ORDER: [EntityKind; 6] = [
        EntityKind::Business,
        EntityKind::Membership,
        EntityKind::StaffProfile,
        EntityKind::Shift,
        EntityKind::TimeEntry,
        EntityKind::TimeOffRequest,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Business => "businesses",
            EntityKind::Membership => "memberships",
            EntityKind::StaffProfile => "staff_profiles",
            EntityKind::Shift => "shifts",
            EntityKind::TimeEntry => "time_entries",
            EntityKind::TimeOffRequest => "time_off_requests",
        }
    }

    /// Column that scopes the table to its tenant. The businesses table is
    /// the tenant root, so it is scoped by its own primary key.
    pub fn tenant_column(&self) -> &'static str {
        match self {
            EntityKind::Business => "id",
            _ => "business_id",
        }
    }
}

/// Shape shared by every replicated entity: a client-generated globally
/// unique id, tenant scoping, wall-clock modification timestamps, a soft
/// delete tombstone, and the local-only [`SyncState`].
pub trait SyncRecord:
    Clone + Send + Sync + Unpin + Serialize + DeserializeOwned + 'static
{
    const KIND: EntityKind;

    fn id(&self) -> &str;
    /// The owning tenant. For [`Business`](super::Business) itself this is
    /// the record's own id.
    fn business_id(&self) -> &str;
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>);
    fn sync_state(&self) -> SyncState;
    fn set_sync_state(&mut self, state: SyncState);
}

/// The slice of a local row the conflict resolver needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaMeta {
    pub updated_at: DateTime<Utc>,
    pub sync_state: SyncState,
}

/// A partial update merged into an existing row by
/// `LocalStore::update`. Empty patches are a no-op and must not refresh
/// `updated_at`.
pub trait Patch<T>: Send {
    fn is_empty(&self) -> bool;
    fn apply(self, target: &mut T);
}
