//! The sync engine's uniform face of the local store. Each operation
//! dispatches the table kind onto the same descriptor-driven helpers the
//! typed CRUD path uses.

use super::SqliteLocalStore;
use crate::application::ports::{PendingRecord, PushedVersion, ReplicaStore};
use crate::domain::entities::{
    Business, EntityKind, Membership, ReplicaMeta, Shift, StaffProfile, SyncRecord, TimeEntry,
    TimeOffRequest,
};
use crate::domain::value_objects::SyncState;
use crate::infrastructure::database::entity::SqlEntity;
use crate::infrastructure::database::{mapper, queries};
use crate::shared::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;

#[async_trait]
impl ReplicaStore for SqliteLocalStore {
    async fn pending_push(
        &self,
        kind: EntityKind,
        business_id: &str,
    ) -> Result<Vec<PendingRecord>> {
        match kind {
            EntityKind::Business => self.pending_push_for::<Business>(business_id).await,
            EntityKind::Membership => self.pending_push_for::<Membership>(business_id).await,
            EntityKind::StaffProfile => self.pending_push_for::<StaffProfile>(business_id).await,
            EntityKind::Shift => self.pending_push_for::<Shift>(business_id).await,
            EntityKind::TimeEntry => self.pending_push_for::<TimeEntry>(business_id).await,
            EntityKind::TimeOffRequest => {
                self.pending_push_for::<TimeOffRequest>(business_id).await
            }
        }
    }

    async fn mark_synced(&self, kind: EntityKind, pushed: &[PushedVersion]) -> Result<()> {
        let sql = queries::mark_synced_sql(kind.table());
        let mut tx = self.pool().get_pool().begin().await?;

        for version in pushed {
            sqlx::query(&sql)
                .bind(SyncState::Synced.as_str())
                .bind(version.id.clone())
                .bind(version.updated_at.timestamp_millis())
                .bind(SyncState::PendingPush.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn replica_meta(&self, kind: EntityKind, id: &str) -> Result<Option<ReplicaMeta>> {
        let sql = queries::select_meta_sql(kind.table());
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(self.pool().get_pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ReplicaMeta {
            updated_at: mapper::datetime(row.try_get("updated_at")?)?,
            sync_state: mapper::sync_state(&row)?,
        }))
    }

    async fn apply_replica(&self, kind: EntityKind, record: &Value) -> Result<()> {
        match kind {
            EntityKind::Business => self.apply_replica_for::<Business>(record).await,
            EntityKind::Membership => self.apply_replica_for::<Membership>(record).await,
            EntityKind::StaffProfile => self.apply_replica_for::<StaffProfile>(record).await,
            EntityKind::Shift => self.apply_replica_for::<Shift>(record).await,
            EntityKind::TimeEntry => self.apply_replica_for::<TimeEntry>(record).await,
            EntityKind::TimeOffRequest => self.apply_replica_for::<TimeOffRequest>(record).await,
        }
    }
}

impl SqliteLocalStore {
    async fn pending_push_for<T: SqlEntity>(&self, business_id: &str) -> Result<Vec<PendingRecord>> {
        let sql = queries::select_pending_sql(T::KIND.table(), T::COLUMNS, T::KIND.tenant_column());
        let rows = sqlx::query(&sql)
            .bind(SyncState::PendingPush.as_str())
            .bind(business_id.to_string())
            .fetch_all(self.pool().get_pool())
            .await?;

        let mut pending = Vec::with_capacity(rows.len());
        for row in &rows {
            let entity = T::from_row(row)?;
            pending.push(PendingRecord {
                id: entity.id().to_string(),
                updated_at: entity.updated_at(),
                // sync_state is marked serde-skip, so the payload never
                // carries the local-only field.
                payload: serde_json::to_value(&entity)?,
            });
        }
        Ok(pending)
    }

    /// Full-field replace (or insert) with `sync_state` forced to
    /// `Synced`. One statement, so readers never see a torn row.
    async fn apply_replica_for<T: SqlEntity>(&self, record: &Value) -> Result<()> {
        let mut entity: T = serde_json::from_value(record.clone())
            .map_err(|e| AppError::remote(T::KIND.table(), format!("malformed record: {e}")))?;
        entity.set_sync_state(SyncState::Synced);

        let sql = queries::upsert_sql(T::KIND.table(), T::COLUMNS);
        entity
            .bind_columns(sqlx::query(&sql))
            .bind(SyncState::Synced.as_str())
            .execute(self.pool().get_pool())
            .await?;
        Ok(())
    }
}
