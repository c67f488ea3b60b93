use super::connection_pool::ConnectionPool;
use super::mapper;
use crate::application::ports::CursorStore;
use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

const SELECT_CURSOR: &str = r#"
    SELECT last_pulled_at FROM sync_cursors
    WHERE business_id = ?1 AND table_name = ?2
"#;

const UPSERT_CURSOR: &str = r#"
    INSERT INTO sync_cursors (business_id, table_name, last_pulled_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(business_id, table_name) DO UPDATE SET
        last_pulled_at = excluded.last_pulled_at
"#;

/// Pull watermarks persisted next to the entity tables, so a restart
/// resumes from the last fully pulled point.
#[derive(Clone)]
pub struct SqliteCursorStore {
    pool: ConnectionPool,
}

impl SqliteCursorStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CursorStore for SqliteCursorStore {
    async fn last_pulled_at(
        &self,
        business_id: &str,
        table: &'static str,
    ) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query(SELECT_CURSOR)
            .bind(business_id.to_string())
            .bind(table)
            .fetch_optional(self.pool.get_pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(mapper::datetime(row.try_get("last_pulled_at")?)?))
    }

    async fn advance(
        &self,
        business_id: &str,
        table: &'static str,
        pulled_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(UPSERT_CURSOR)
            .bind(business_id.to_string())
            .bind(table)
            .bind(pulled_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }
}
