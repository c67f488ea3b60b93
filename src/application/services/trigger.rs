use super::sync_engine::{SyncEngine, SyncOutcome};
use crate::application::session::SessionContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Why a sync cycle was requested. Trigger sources stay decoupled from the
/// engine: they only ever send one of these over the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The user asked for a refresh.
    Manual,
    /// The app returned to the foreground.
    AppForeground,
    /// The periodic timer fired.
    Timer,
    /// The signed-in session changed (login, tenant switch).
    SessionChanged,
}

/// Owns the trigger channel and the background tasks draining it. Each
/// received trigger drives one engine cycle; results are logged, never
/// surfaced to the sender.
pub struct SyncScheduler {
    tx: mpsc::Sender<SyncTrigger>,
}

impl SyncScheduler {
    /// Spawn the listener task and, when an interval is given, a timer
    /// task feeding [`SyncTrigger::Timer`] into the same channel. Both
    /// tasks end when the scheduler (and with it the channel) is dropped.
    pub fn spawn(
        engine: Arc<SyncEngine>,
        session: SessionContext,
        auto_sync_interval: Option<Duration>,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<SyncTrigger>(16);

        tokio::spawn(async move {
            while let Some(trigger) = rx.recv().await {
                match engine.sync_now(&session).await {
                    Ok(SyncOutcome::Completed(report)) => {
                        info!(
                            ?trigger,
                            pushed = report.pushed,
                            pulled = report.pulled,
                            "triggered sync complete"
                        );
                    }
                    Ok(outcome) => debug!(?trigger, ?outcome, "sync skipped"),
                    Err(err) => error!(?trigger, %err, "sync cycle failed"),
                }
            }
            debug!("sync trigger listener terminated");
        });

        if let Some(interval) = auto_sync_interval {
            let timer_tx = tx.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // The first tick fires immediately; skip it so spawning
                // the scheduler does not itself start a cycle.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    if timer_tx.send(SyncTrigger::Timer).await.is_err() {
                        break;
                    }
                }
            });
        }

        Self { tx }
    }

    /// Enqueue a trigger. Returns `false` when the listener has shut down.
    pub async fn trigger(&self, trigger: SyncTrigger) -> bool {
        self.tx.send(trigger).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{RemoteStore, SharedConnectivity};
    use crate::domain::value_objects::StaffRole;
    use crate::infrastructure::database::{ConnectionPool, SqliteCursorStore, SqliteLocalStore};
    use crate::infrastructure::remote::MemoryRemoteStore;

    #[tokio::test]
    async fn manual_trigger_drives_a_cycle() {
        let pool = ConnectionPool::in_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = SqliteLocalStore::new(pool);
        let cursors = SqliteCursorStore::new(store.pool().clone());
        let remote = Arc::new(MemoryRemoteStore::new());
        let engine = Arc::new(SyncEngine::new(
            Arc::new(store.clone()),
            remote.clone() as Arc<dyn RemoteStore>,
            Arc::new(cursors),
            Arc::new(SharedConnectivity::new(true)),
        ));
        let session = SessionContext::new(
            "user-1".to_string(),
            "biz-1".to_string(),
            StaffRole::Admin,
        );

        let scheduler = SyncScheduler::spawn(engine, session, None);
        assert!(scheduler.trigger(SyncTrigger::Manual).await);

        // The listener runs in the background; wait for its cycle's
        // table queries to land.
        for _ in 0..100 {
            if remote.query_calls() >= 6 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(remote.query_calls(), 6);
    }
}
