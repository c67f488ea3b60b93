use super::{SyncEngine, SyncReport};
use crate::application::session::SessionContext;
use crate::domain::conflict::{Winner, resolve};
use crate::domain::entities::EntityKind;
use crate::shared::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

impl SyncEngine {
    /// Fetch remote changes since each table's cursor and apply the
    /// winners locally. Cursors advance to the cycle start time captured
    /// here — not the max observed row timestamp — so rows written
    /// between the query and the cursor update are re-fetched next cycle
    /// instead of lost.
    pub(super) async fn pull_phase(
        &self,
        session: &SessionContext,
        report: &mut SyncReport,
    ) -> Result<()> {
        let cycle_started_at = Utc::now();

        for kind in EntityKind::SYNC_ORDER {
            match self.pull_table(kind, session, cycle_started_at).await {
                Ok(count) => report.pulled += count,
                Err(err) if err.is_remote() => {
                    warn!(table = kind.table(), %err, "pull failed, cursor not advanced");
                    report.failed_tables.push(kind.table());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn pull_table(
        &self,
        kind: EntityKind,
        session: &SessionContext,
        cycle_started_at: DateTime<Utc>,
    ) -> Result<u32> {
        let since = self
            .cursors
            .last_pulled_at(&session.business_id, kind.table())
            .await?;
        let records = self
            .remote
            .query_changed_since(kind.table(), &session.business_id, since)
            .await?;

        let mut applied = 0;
        for record in &records {
            let (id, remote_updated_at) = record_version(kind, record)?;
            let local = self.local.replica_meta(kind, id).await?;

            if resolve(local.as_ref(), remote_updated_at) == Winner::Remote {
                self.local.apply_replica(kind, record).await?;
                applied += 1;
            }
        }

        self.cursors
            .advance(&session.business_id, kind.table(), cycle_started_at)
            .await?;
        Ok(applied)
    }
}

/// Id and modification timestamp of a remote record. A payload missing
/// either is a malformed remote response, handled like any other remote
/// rejection so the table retries wholesale.
fn record_version(kind: EntityKind, record: &Value) -> Result<(&str, DateTime<Utc>)> {
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::remote(kind.table(), "record without id"))?;

    let updated_at = record
        .get("updated_at")
        .and_then(Value::as_i64)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| AppError::remote(kind.table(), format!("record {id} without updated_at")))?;

    Ok((id, updated_at))
}
