use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// The authoritative backend, reduced to the two operations the sync
/// engine needs. Records cross this boundary as JSON objects with
/// local-only fields already stripped.
///
/// Contract: `upsert` is idempotent (re-sending the same payload is safe),
/// and the backend enforces tenant isolation server-side — the engine
/// trusts returned rows to be scoped to the requested tenant and does not
/// re-verify them.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn upsert(&self, table: &'static str, records: &[Value]) -> Result<()>;

    /// All records of `table` for `business_id` with `updated_at > since`,
    /// or every record when `since` is absent (first-sync bootstrap).
    async fn query_changed_since(
        &self,
        table: &'static str,
        business_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Value>>;
}
