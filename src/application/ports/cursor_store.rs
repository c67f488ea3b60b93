use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persisted pull watermarks, one per (tenant, table). A cursor exists
/// only after the table's first successful pull and is advanced only after
/// a pull fully succeeds for that table.
#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn last_pulled_at(
        &self,
        business_id: &str,
        table: &'static str,
    ) -> Result<Option<DateTime<Utc>>>;

    async fn advance(
        &self,
        business_id: &str,
        table: &'static str,
        pulled_at: DateTime<Utc>,
    ) -> Result<()>;
}
