use super::{SyncEngine, SyncReport};
use crate::application::ports::PushedVersion;
use crate::application::session::SessionContext;
use crate::domain::entities::EntityKind;
use crate::shared::error::Result;
use tracing::warn;

impl SyncEngine {
    /// Drain locally pending rows to the remote, table by table in
    /// dependency order. A rejected table is logged and skipped; the rest
    /// still push.
    pub(super) async fn push_phase(
        &self,
        session: &SessionContext,
        report: &mut SyncReport,
    ) -> Result<()> {
        for kind in EntityKind::SYNC_ORDER {
            match self.push_table(kind, session).await {
                Ok(count) => report.pushed += count,
                Err(err) if err.is_remote() => {
                    warn!(table = kind.table(), %err, "push rejected, retrying next cycle");
                    report.failed_tables.push(kind.table());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn push_table(&self, kind: EntityKind, session: &SessionContext) -> Result<u32> {
        let pending = self.local.pending_push(kind, &session.business_id).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        // The id/version set is captured here, before the network call.
        // Rows mutated while the upsert is in flight will not match their
        // captured version and stay PendingPush.
        let versions: Vec<PushedVersion> = pending.iter().map(|p| p.version()).collect();
        let payloads: Vec<serde_json::Value> = pending.into_iter().map(|p| p.payload).collect();

        self.remote.upsert(kind.table(), &payloads).await?;
        self.local.mark_synced(kind, &versions).await?;

        Ok(versions.len() as u32)
    }
}
