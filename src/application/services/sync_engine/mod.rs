mod pull;
mod push;
#[cfg(test)]
mod tests;

use crate::application::ports::{ConnectivityProbe, CursorStore, RemoteStore, ReplicaStore};
use crate::application::session::SessionContext;
use crate::shared::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// What a `sync_now` call did. Offline and busy conditions are ordinary
/// outcomes, not errors — callers may fire triggers at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    SkippedOffline,
    SkippedBusy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub pushed: u32,
    pub pulled: u32,
    /// Tables whose push or pull was rejected by the remote this cycle.
    /// Their pending rows and cursors are untouched and retried next cycle.
    pub failed_tables: Vec<&'static str>,
}

/// Push-then-pull orchestrator over one tenant's tables.
///
/// One cycle runs at a time per engine: a trigger arriving while a cycle
/// is in flight returns [`SyncOutcome::SkippedBusy`] without touching the
/// network. Local reads and writes never wait on a cycle; the engine only
/// issues individually-atomic store operations.
pub struct SyncEngine {
    local: Arc<dyn ReplicaStore>,
    remote: Arc<dyn RemoteStore>,
    cursors: Arc<dyn CursorStore>,
    connectivity: Arc<dyn ConnectivityProbe>,
    in_flight: Arc<AtomicBool>,
}

impl SyncEngine {
    pub fn new(
        local: Arc<dyn ReplicaStore>,
        remote: Arc<dyn RemoteStore>,
        cursors: Arc<dyn CursorStore>,
        connectivity: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            local,
            remote,
            cursors,
            connectivity,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one push-then-pull cycle for the session's tenant.
    ///
    /// Remote failures are contained per table; local storage failures
    /// abort the cycle and propagate. An interrupted cycle (process kill
    /// mid-call) leaves rows `PendingPush` for the next cycle, because
    /// state transitions only happen after a remote call returns.
    pub async fn sync_now(&self, session: &SessionContext) -> Result<SyncOutcome> {
        if !self.connectivity.is_connected().await {
            debug!(business_id = %session.business_id, "offline, skipping sync cycle");
            return Ok(SyncOutcome::SkippedOffline);
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(business_id = %session.business_id, "sync already in flight, skipping");
            return Ok(SyncOutcome::SkippedBusy);
        };

        let mut report = SyncReport::default();
        self.push_phase(session, &mut report).await?;
        self.pull_phase(session, &mut report).await?;

        info!(
            business_id = %session.business_id,
            pushed = report.pushed,
            pulled = report.pulled,
            failed = report.failed_tables.len(),
            "sync cycle complete"
        );
        Ok(SyncOutcome::Completed(report))
    }
}

/// Holds the single-flight flag for the duration of a cycle. Released on
/// drop, so an early return or panic cannot wedge the engine.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
