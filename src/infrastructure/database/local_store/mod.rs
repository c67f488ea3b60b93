mod replica;

use super::connection_pool::ConnectionPool;
use super::entity::SqlEntity;
use super::queries;
use crate::domain::entities::{EntityKind, Patch, Shift, SyncRecord, TimeEntry, TimeOffRequest};
use crate::domain::value_objects::{RequestStatus, SyncState};
use crate::shared::error::{AppError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// The single writable, immediately-consistent view of tenant data.
///
/// UI and domain code use the typed operations here; the sync engine uses
/// the uniform [`ReplicaStore`](crate::application::ports::ReplicaStore)
/// face implemented in the sibling module. Every operation is one SQLite
/// transaction, so readers never observe a row whose data fields and
/// `sync_state` are out of step.
#[derive(Clone)]
pub struct SqliteLocalStore {
    pool: ConnectionPool,
}

impl SqliteLocalStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Persist a freshly constructed entity. Constructors assign the id
    /// and timestamps; insert forces `PendingPush` and enforces the
    /// write-ordering discipline: a non-root row is rejected with
    /// `ConstraintViolation` unless its business already exists locally.
    pub async fn insert<T: SqlEntity>(&self, entity: &T) -> Result<()> {
        let mut tx = self.pool.get_pool().begin().await?;

        if T::KIND != EntityKind::Business {
            let exists = sqlx::query(&queries::exists_sql(EntityKind::Business.table()))
                .bind(entity.business_id().to_string())
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(AppError::ConstraintViolation(format!(
                    "business {} does not exist locally",
                    entity.business_id()
                )));
            }
        }

        let sql = queries::insert_sql(T::KIND.table(), T::COLUMNS);
        entity
            .bind_columns(sqlx::query(&sql))
            .bind(SyncState::PendingPush.as_str())
            .execute(&mut *tx)
            .await
            .map_err(constraint_error)?;

        tx.commit().await?;
        Ok(())
    }

    /// Merge a patch into an existing row, refreshing `updated_at` and
    /// flipping the row back to `PendingPush`. An empty patch writes
    /// nothing; a missing id is `NotFound`. Returns the row as written.
    pub async fn update<T: SqlEntity>(&self, id: &str, patch: impl Patch<T>) -> Result<T> {
        let mut tx = self.pool.get_pool().begin().await?;

        let select = queries::select_by_id_sql(T::KIND.table(), T::COLUMNS);
        let row = sqlx::query(&select)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(AppError::NotFound(format!("{} {id}", T::KIND.table())));
        };
        let mut entity = T::from_row(&row)?;

        if patch.is_empty() {
            return Ok(entity);
        }

        patch.apply(&mut entity);
        entity.set_updated_at(next_updated_at(entity.updated_at()));
        entity.set_sync_state(SyncState::PendingPush);

        let sql = queries::upsert_sql(T::KIND.table(), T::COLUMNS);
        entity
            .bind_columns(sqlx::query(&sql))
            .bind(SyncState::PendingPush.as_str())
            .execute(&mut *tx)
            .await
            .map_err(constraint_error)?;

        tx.commit().await?;
        Ok(entity)
    }

    /// Fetch one row by id, tombstoned or not.
    pub async fn get_by_id<T: SqlEntity>(&self, id: &str) -> Result<Option<T>> {
        let sql = queries::select_by_id_sql(T::KIND.table(), T::COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(self.pool.get_pool())
            .await?;
        row.map(|row| T::from_row(&row)).transpose()
    }

    /// All live (non-tombstoned) rows of the tenant, newest first.
    pub async fn list<T: SqlEntity>(&self, business_id: &str) -> Result<Vec<T>> {
        let sql = queries::select_list_sql(T::KIND.table(), T::COLUMNS, T::KIND.tenant_column());
        let rows = sqlx::query(&sql)
            .bind(business_id.to_string())
            .fetch_all(self.pool.get_pool())
            .await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Logically delete a row and everything below it in the dependency
    /// graph, in one transaction. The tombstones travel through the same
    /// push/pull path as any other edit.
    pub async fn soft_delete<T: SqlEntity>(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.get_pool().begin().await?;

        let select = queries::select_by_id_sql(T::KIND.table(), T::COLUMNS);
        let row = sqlx::query(&select)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(AppError::NotFound(format!("{} {id}", T::KIND.table())));
        };
        let entity = T::from_row(&row)?;

        let stamp = next_updated_at(entity.updated_at());
        let stamp_ms = stamp.timestamp_millis();

        sqlx::query(&queries::tombstone_by_sql(T::KIND.table(), "id"))
            .bind(stamp_ms)
            .bind(stamp_ms)
            .bind(SyncState::PendingPush.as_str())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        let now_ms = Utc::now().timestamp_millis();
        for (table, key_column) in cascade_children(T::KIND) {
            sqlx::query(&queries::tombstone_by_sql(table, key_column))
                .bind(now_ms)
                .bind(now_ms)
                .bind(SyncState::PendingPush.as_str())
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Published and draft shifts of a tenant over an inclusive date range.
    pub async fn shifts_in_range(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Shift>> {
        let sql = format!(
            "SELECT {cols}, sync_state FROM shifts \
             WHERE business_id = ? AND date >= ? AND date <= ? AND deleted_at IS NULL \
             ORDER BY date, start_time",
            cols = Shift::COLUMNS.join(", "),
        );
        let rows = sqlx::query(&sql)
            .bind(business_id.to_string())
            .bind(start.format("%Y-%m-%d").to_string())
            .bind(end.format("%Y-%m-%d").to_string())
            .fetch_all(self.pool.get_pool())
            .await?;
        rows.iter().map(Shift::from_row).collect()
    }

    /// The staff member's session that has not clocked out yet, if any.
    pub async fn open_time_entry(&self, staff_id: &str) -> Result<Option<TimeEntry>> {
        let sql = format!(
            "SELECT {cols}, sync_state FROM time_entries \
             WHERE staff_id = ? AND clock_out IS NULL AND deleted_at IS NULL \
             ORDER BY clock_in DESC LIMIT 1",
            cols = TimeEntry::COLUMNS.join(", "),
        );
        let row = sqlx::query(&sql)
            .bind(staff_id.to_string())
            .fetch_optional(self.pool.get_pool())
            .await?;
        row.map(|row| TimeEntry::from_row(&row)).transpose()
    }

    pub async fn pending_requests(&self, business_id: &str) -> Result<Vec<TimeOffRequest>> {
        let sql = format!(
            "SELECT {cols}, sync_state FROM time_off_requests \
             WHERE business_id = ? AND status = ? AND deleted_at IS NULL \
             ORDER BY start_date",
            cols = TimeOffRequest::COLUMNS.join(", "),
        );
        let rows = sqlx::query(&sql)
            .bind(business_id.to_string())
            .bind(RequestStatus::Pending.as_str())
            .fetch_all(self.pool.get_pool())
            .await?;
        rows.iter().map(TimeOffRequest::from_row).collect()
    }
}

/// Tables tombstoned alongside a deleted row, keyed by the column that
/// references it.
fn cascade_children(kind: EntityKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        EntityKind::Business => &[
            ("memberships", "business_id"),
            ("staff_profiles", "business_id"),
            ("shifts", "business_id"),
            ("time_entries", "business_id"),
            ("time_off_requests", "business_id"),
        ],
        EntityKind::StaffProfile => &[
            ("shifts", "staff_id"),
            ("time_entries", "staff_id"),
            ("time_off_requests", "staff_id"),
        ],
        EntityKind::Shift => &[("time_entries", "shift_id")],
        _ => &[],
    }
}

/// `updated_at` is monotonic per row, and a mutation must always change
/// the version the push path compares against — even two writes landing
/// in the same millisecond.
fn next_updated_at(current: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > current {
        now
    } else {
        current + Duration::milliseconds(1)
    }
}

fn constraint_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        let message = db.message();
        if message.contains("FOREIGN KEY constraint failed")
            || message.contains("UNIQUE constraint failed")
        {
            return AppError::ConstraintViolation(message.to_string());
        }
    }
    AppError::Database(err)
}
