use crate::domain::entities::{EntityKind, ReplicaMeta};
use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// A row captured for push: its wire payload plus the exact version the
/// payload was taken from. Marking synced is guarded by the captured
/// `updated_at`, so a row mutated while the push is in flight keeps its
/// pending state.
#[derive(Debug, Clone)]
pub struct PendingRecord {
    pub id: String,
    pub updated_at: DateTime<Utc>,
    pub payload: Value,
}

impl PendingRecord {
    pub fn version(&self) -> PushedVersion {
        PushedVersion {
            id: self.id.clone(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedVersion {
    pub id: String,
    pub updated_at: DateTime<Utc>,
}

/// The sync engine's face of the local store. Uniform across all entity
/// tables; the engine never sees a typed entity, only wire payloads and
/// row metadata.
#[async_trait]
pub trait ReplicaStore: Send + Sync {
    /// All rows of the table with `sync_state = PendingPush`, scoped to
    /// the tenant, as wire payloads (sync_state stripped).
    async fn pending_push(&self, kind: EntityKind, business_id: &str)
        -> Result<Vec<PendingRecord>>;

    /// Flip exactly the given (id, updated_at) versions to `Synced`. Rows
    /// whose `updated_at` no longer matches are left untouched.
    async fn mark_synced(&self, kind: EntityKind, pushed: &[PushedVersion]) -> Result<()>;

    /// Conflict-resolution metadata for a single row, `None` when the row
    /// does not exist locally.
    async fn replica_meta(&self, kind: EntityKind, id: &str) -> Result<Option<ReplicaMeta>>;

    /// Replace every field of the row with the remote version (insert if
    /// absent) and force `sync_state = Synced`. Pull-path only.
    async fn apply_replica(&self, kind: EntityKind, record: &Value) -> Result<()>;
}
