use super::{SyncEngine, SyncOutcome};
use crate::application::ports::{CursorStore, RemoteStore, SharedConnectivity};
use crate::application::session::SessionContext;
use crate::domain::entities::{Business, EntityKind, Shift, ShiftPatch};
use crate::domain::value_objects::{ShiftStatus, StaffRole, SyncState};
use crate::infrastructure::database::{ConnectionPool, SqliteCursorStore, SqliteLocalStore};
use crate::infrastructure::remote::MemoryRemoteStore;
use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

struct Device {
    engine: Arc<SyncEngine>,
    store: SqliteLocalStore,
    cursors: SqliteCursorStore,
    connectivity: SharedConnectivity,
    remote: Arc<MemoryRemoteStore>,
}

async fn device(remote: Arc<MemoryRemoteStore>) -> Device {
    let pool = ConnectionPool::in_memory().await.unwrap();
    pool.migrate().await.unwrap();
    let store = SqliteLocalStore::new(pool);
    let cursors = SqliteCursorStore::new(store.pool().clone());
    let connectivity = SharedConnectivity::new(true);

    let engine = Arc::new(SyncEngine::new(
        Arc::new(store.clone()),
        remote.clone() as Arc<dyn RemoteStore>,
        Arc::new(cursors.clone()),
        Arc::new(connectivity.clone()),
    ));

    Device {
        engine,
        store,
        cursors,
        connectivity,
        remote,
    }
}

async fn single_device() -> Device {
    device(Arc::new(MemoryRemoteStore::new())).await
}

fn session_for(business_id: &str) -> SessionContext {
    SessionContext::new("user-1".to_string(), business_id.to_string(), StaffRole::Admin)
}

async fn seeded_business(store: &SqliteLocalStore) -> Business {
    let business = Business::new("Demo Salon".to_string(), "UTC".to_string());
    store.insert(&business).await.unwrap();
    business
}

fn shift_for(business_id: &str) -> Shift {
    Shift::new(
        business_id.to_string(),
        None,
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    )
}

fn wire(entity: &impl serde::Serialize) -> Value {
    serde_json::to_value(entity).unwrap()
}

fn completed(outcome: SyncOutcome) -> super::SyncReport {
    match outcome {
        SyncOutcome::Completed(report) => report,
        other => panic!("expected completed cycle, got {other:?}"),
    }
}

/// Real wall clocks tick in milliseconds; a short pause keeps "later"
/// edits strictly later than the previous cycle's cursor.
async fn tick() {
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
}

#[tokio::test]
async fn offline_cycle_touches_nothing() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let session = session_for(&business.id);

    dev.connectivity.set_online(false);
    let outcome = dev.engine.sync_now(&session).await.unwrap();

    assert_eq!(outcome, SyncOutcome::SkippedOffline);
    assert_eq!(dev.remote.upsert_calls(), 0);
    assert_eq!(dev.remote.query_calls(), 0);

    let row: Business = dev.store.get_by_id(&business.id).await.unwrap().unwrap();
    assert_eq!(row.sync_state, SyncState::PendingPush);
    assert!(dev
        .cursors
        .last_pulled_at(&business.id, "businesses")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn push_then_pull_converges_a_fresh_tenant() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let shift = shift_for(&business.id);
    dev.store.insert(&shift).await.unwrap();
    let session = session_for(&business.id);

    let report = completed(dev.engine.sync_now(&session).await.unwrap());
    assert_eq!(report.pushed, 2);
    assert!(report.failed_tables.is_empty());

    // The remote now holds both records, stripped of local-only state.
    let remote_shift = dev.remote.record("shifts", &shift.id).unwrap();
    assert!(remote_shift.get("sync_state").is_none());
    assert_eq!(remote_shift, wire(&shift));

    let row: Shift = dev.store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(row.sync_state, SyncState::Synced);

    // Every table's cursor exists after the first full pull.
    for kind in EntityKind::SYNC_ORDER {
        assert!(dev
            .cursors
            .last_pulled_at(&business.id, kind.table())
            .await
            .unwrap()
            .is_some());
    }
}

#[tokio::test]
async fn concurrent_triggers_share_one_round_trip() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let session = session_for(&business.id);

    let (first, second) = tokio::join!(
        dev.engine.sync_now(&session),
        dev.engine.sync_now(&session),
    );
    let outcomes = [first.unwrap(), second.unwrap()];

    assert!(outcomes.contains(&SyncOutcome::SkippedBusy));
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, SyncOutcome::Completed(_))));

    // One query per table, one upsert for the single pending table.
    assert_eq!(dev.remote.query_calls(), 6);
    assert_eq!(dev.remote.upsert_calls(), 1);
}

#[tokio::test]
async fn second_cycle_without_remote_changes_is_idempotent() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let shift = shift_for(&business.id);
    dev.store.insert(&shift).await.unwrap();
    let session = session_for(&business.id);

    completed(dev.engine.sync_now(&session).await.unwrap());
    let business_snapshot: Business = dev.store.get_by_id(&business.id).await.unwrap().unwrap();
    let shift_snapshot: Shift = dev.store.get_by_id(&shift.id).await.unwrap().unwrap();

    tick().await;
    let report = completed(dev.engine.sync_now(&session).await.unwrap());
    assert_eq!(report.pushed, 0);
    assert_eq!(report.pulled, 0);

    let business_after: Business = dev.store.get_by_id(&business.id).await.unwrap().unwrap();
    let shift_after: Shift = dev.store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(wire(&business_after), wire(&business_snapshot));
    assert_eq!(wire(&shift_after), wire(&shift_snapshot));
    assert_eq!(business_after.sync_state, SyncState::Synced);
}

#[tokio::test]
async fn pull_applies_a_strictly_newer_remote_edit_over_a_pending_one() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let shift = shift_for(&business.id);
    dev.store.insert(&shift).await.unwrap();
    let session = session_for(&business.id);
    completed(dev.engine.sync_now(&session).await.unwrap());

    tick().await;
    let local = dev
        .store
        .update::<Shift>(
            &shift.id,
            ShiftPatch {
                notes: Some(Some("local edit".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Another device edited the same row a minute "later".
    let mut remote_edit: Shift = local.clone();
    remote_edit.notes = Some("remote edit".to_string());
    remote_edit.status = ShiftStatus::Published;
    remote_edit.updated_at = local.updated_at + Duration::seconds(60);
    dev.remote.put_record("shifts", wire(&remote_edit));

    // Keep the local edit out of the remote so the race is visible.
    dev.remote.set_failing_upsert("shifts", true);
    let report = completed(dev.engine.sync_now(&session).await.unwrap());
    assert_eq!(report.failed_tables, vec!["shifts"]);

    let row: Shift = dev.store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(wire(&row), wire(&remote_edit));
    assert_eq!(row.sync_state, SyncState::Synced);
}

#[tokio::test]
async fn pull_keeps_a_pending_edit_that_is_newer_than_the_remote() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let shift = shift_for(&business.id);
    dev.store.insert(&shift).await.unwrap();
    let session = session_for(&business.id);
    completed(dev.engine.sync_now(&session).await.unwrap());

    tick().await;
    let local = dev
        .store
        .update::<Shift>(
            &shift.id,
            ShiftPatch {
                notes: Some(Some("local, newest".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The competing remote edit is older than the local one but newer
    // than the cursor, so it is fetched and must lose.
    let mut remote_edit: Shift = local.clone();
    remote_edit.notes = Some("remote, older".to_string());
    remote_edit.updated_at = local.updated_at - Duration::milliseconds(2);
    dev.remote.put_record("shifts", wire(&remote_edit));

    dev.remote.set_failing_upsert("shifts", true);
    completed(dev.engine.sync_now(&session).await.unwrap());

    let row: Shift = dev.store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(row.notes.as_deref(), Some("local, newest"));
    assert_eq!(row.sync_state, SyncState::PendingPush);

    // The surviving edit wins the table on the next healthy cycle.
    dev.remote.set_failing_upsert("shifts", false);
    tick().await;
    completed(dev.engine.sync_now(&session).await.unwrap());
    let remote_row = dev.remote.record("shifts", &shift.id).unwrap();
    assert_eq!(remote_row, wire(&row));
}

#[tokio::test]
async fn push_failures_are_isolated_per_table() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let shift = shift_for(&business.id);
    dev.store.insert(&shift).await.unwrap();
    let session = session_for(&business.id);

    dev.remote.set_failing_upsert("businesses", true);
    let report = completed(dev.engine.sync_now(&session).await.unwrap());

    assert_eq!(report.failed_tables, vec!["businesses"]);
    assert_eq!(dev.remote.record_count("shifts"), 1);
    assert_eq!(dev.remote.record_count("businesses"), 0);

    let business_row: Business = dev.store.get_by_id(&business.id).await.unwrap().unwrap();
    let shift_row: Shift = dev.store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(business_row.sync_state, SyncState::PendingPush);
    assert_eq!(shift_row.sync_state, SyncState::Synced);

    // Next healthy cycle retries the failed table.
    dev.remote.set_failing_upsert("businesses", false);
    completed(dev.engine.sync_now(&session).await.unwrap());
    assert_eq!(dev.remote.record_count("businesses"), 1);
}

#[tokio::test]
async fn failed_pull_leaves_that_cursor_behind() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let session = session_for(&business.id);

    dev.remote.set_failing_query("shifts", true);
    let report = completed(dev.engine.sync_now(&session).await.unwrap());

    assert_eq!(report.failed_tables, vec!["shifts"]);
    assert!(dev
        .cursors
        .last_pulled_at(&business.id, "shifts")
        .await
        .unwrap()
        .is_none());
    assert!(dev
        .cursors
        .last_pulled_at(&business.id, "businesses")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn cursor_advances_to_cycle_start_not_max_row_timestamp() {
    let dev = single_device().await;
    let business = seeded_business(&dev.store).await;
    let session = session_for(&business.id);

    // A stale remote row from years ago must not drag the cursor back.
    let mut old = shift_for(&business.id);
    old.updated_at = DateTime::<Utc>::from_timestamp_millis(1_577_836_800_000).unwrap();
    dev.remote.put_record("shifts", wire(&old));

    let before = Utc::now();
    completed(dev.engine.sync_now(&session).await.unwrap());
    let after = Utc::now();

    // The stale row was pulled in...
    let pulled: Shift = dev.store.get_by_id(&old.id).await.unwrap().unwrap();
    assert_eq!(pulled.updated_at, old.updated_at);

    // ...but the cursor sits at the cycle start, not at the row's time.
    let cursor = dev
        .cursors
        .last_pulled_at(&business.id, "shifts")
        .await
        .unwrap()
        .unwrap();
    assert!(cursor > old.updated_at);
    assert!(cursor >= before - Duration::milliseconds(1));
    assert!(cursor <= after);
}

/// Remote wrapper that mutates a row locally while its push is in
/// flight, like a user editing during a slow request.
struct RacingRemote {
    inner: Arc<MemoryRemoteStore>,
    store: SqliteLocalStore,
    shift_id: String,
    raced: AtomicBool,
}

#[async_trait]
impl RemoteStore for RacingRemote {
    async fn upsert(&self, table: &'static str, records: &[Value]) -> Result<()> {
        if table == "shifts" && !self.raced.swap(true, Ordering::SeqCst) {
            self.store
                .update::<Shift>(
                    &self.shift_id,
                    ShiftPatch {
                        notes: Some(Some("edited mid-flight".to_string())),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        self.inner.upsert(table, records).await
    }

    async fn query_changed_since(
        &self,
        table: &'static str,
        business_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Value>> {
        self.inner.query_changed_since(table, business_id, since).await
    }
}

#[tokio::test]
async fn row_mutated_during_push_stays_pending() {
    let pool = ConnectionPool::in_memory().await.unwrap();
    pool.migrate().await.unwrap();
    let store = SqliteLocalStore::new(pool);
    let cursors = SqliteCursorStore::new(store.pool().clone());
    let inner = Arc::new(MemoryRemoteStore::new());

    let business = seeded_business(&store).await;
    let shift = shift_for(&business.id);
    store.insert(&shift).await.unwrap();

    let remote = Arc::new(RacingRemote {
        inner: inner.clone(),
        store: store.clone(),
        shift_id: shift.id.clone(),
        raced: AtomicBool::new(false),
    });
    let engine = SyncEngine::new(
        Arc::new(store.clone()),
        remote,
        Arc::new(cursors),
        Arc::new(SharedConnectivity::new(true)),
    );
    let session = session_for(&business.id);

    completed(engine.sync_now(&session).await.unwrap());

    // The pushed snapshot reached the remote, but the row kept its
    // mid-flight edit and its pending state.
    let row: Shift = store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(row.notes.as_deref(), Some("edited mid-flight"));
    assert_eq!(row.sync_state, SyncState::PendingPush);
    let remote_row = inner.record("shifts", &shift.id).unwrap();
    assert!(remote_row.get("notes").unwrap().is_null());

    // The follow-up cycle drains the surviving edit.
    tick().await;
    completed(engine.sync_now(&session).await.unwrap());
    let row: Shift = store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(row.sync_state, SyncState::Synced);
    let remote_row = inner.record("shifts", &shift.id).unwrap();
    assert_eq!(remote_row.get("notes").unwrap().as_str(), Some("edited mid-flight"));
}

#[tokio::test]
async fn two_devices_converge_on_whole_record_overwrites() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let a = device(remote.clone()).await;
    let b = device(remote.clone()).await;

    // Device A creates the tenant and one shift, then publishes them.
    let business = seeded_business(&a.store).await;
    let shift = shift_for(&business.id);
    a.store.insert(&shift).await.unwrap();
    let session_a = session_for(&business.id);
    let session_b = SessionContext::new(
        "user-2".to_string(),
        business.id.clone(),
        StaffRole::Staff,
    );
    completed(a.engine.sync_now(&session_a).await.unwrap());

    // Device B bootstraps the tenant from the remote.
    completed(b.engine.sync_now(&session_b).await.unwrap());
    let b_copy: Shift = b.store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(b_copy.sync_state, SyncState::Synced);
    assert_eq!(b_copy.status, ShiftStatus::Draft);

    // A publishes the shift and pushes.
    tick().await;
    a.store
        .update::<Shift>(
            &shift.id,
            ShiftPatch {
                status: Some(ShiftStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    completed(a.engine.sync_now(&session_a).await.unwrap());

    // B, offline, annotates its stale copy later in wall-clock time.
    tick().await;
    let b_edit = b
        .store
        .update::<Shift>(
            &shift.id,
            ShiftPatch {
                notes: Some(Some("swap with Dana".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // B's sync pushes its entire record: the remote ends up with B's
    // row wholesale, including B's stale Draft status. No field merge.
    completed(b.engine.sync_now(&session_b).await.unwrap());
    let remote_row = remote.record("shifts", &shift.id).unwrap();
    assert_eq!(remote_row, wire(&b_edit));
    assert_eq!(remote_row.get("status").unwrap().as_str(), Some("draft"));
    assert_eq!(
        remote_row.get("notes").unwrap().as_str(),
        Some("swap with Dana")
    );

    // A pulls and converges on B's record byte for byte.
    tick().await;
    completed(a.engine.sync_now(&session_a).await.unwrap());
    let a_row: Shift = a.store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert_eq!(wire(&a_row), wire(&b_edit));
    assert_eq!(a_row.status, ShiftStatus::Draft);
    assert_eq!(a_row.sync_state, SyncState::Synced);
}

#[tokio::test]
async fn tombstones_propagate_like_any_other_edit() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let a = device(remote.clone()).await;
    let b = device(remote.clone()).await;

    let business = seeded_business(&a.store).await;
    let shift = shift_for(&business.id);
    a.store.insert(&shift).await.unwrap();
    let session_a = session_for(&business.id);
    let session_b = session_for(&business.id);
    completed(a.engine.sync_now(&session_a).await.unwrap());
    completed(b.engine.sync_now(&session_b).await.unwrap());

    tick().await;
    a.store.soft_delete::<Shift>(&shift.id).await.unwrap();
    completed(a.engine.sync_now(&session_a).await.unwrap());

    tick().await;
    completed(b.engine.sync_now(&session_b).await.unwrap());

    let a_row: Shift = a.store.get_by_id(&shift.id).await.unwrap().unwrap();
    let b_row: Shift = b.store.get_by_id(&shift.id).await.unwrap().unwrap();
    assert!(a_row.deleted_at.is_some());
    assert_eq!(b_row.deleted_at, a_row.deleted_at);
    assert_eq!(b_row.sync_state, SyncState::Synced);

    // The row survives physically but disappears from reads.
    assert!(b.store.list::<Shift>(&business.id).await.unwrap().is_empty());
}
