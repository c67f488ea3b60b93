use super::record::{EntityKind, Patch, SyncRecord};
use crate::domain::value_objects::SyncState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One clock-in/clock-out session against a shift.
///
/// The table carries an explicit `business_id` so the pull path can filter
/// by tenant instead of trusting server-side row scoping alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub business_id: String,
    pub shift_id: String,
    pub staff_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub clock_in: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub clock_out: Option<DateTime<Utc>>,
    pub minutes_late: i64,
    pub total_minutes: i64,
    pub source: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip, default)]
    pub sync_state: SyncState,
}

impl TimeEntry {
    pub fn clock_in(
        business_id: String,
        shift_id: String,
        staff_id: String,
        at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_id,
            shift_id,
            staff_id,
            clock_in: at,
            clock_out: None,
            minutes_late: 0,
            total_minutes: 0,
            source: "mobile".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            sync_state: SyncState::PendingPush,
        }
    }

    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}

impl SyncRecord for TimeEntry {
    const KIND: EntityKind = EntityKind::TimeEntry;

    fn id(&self) -> &str {
        &self.id
    }

    fn business_id(&self) -> &str {
        &self.business_id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) {
        self.deleted_at = at;
    }

    fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    fn set_sync_state(&mut self, state: SyncState) {
        self.sync_state = state;
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeEntryPatch {
    pub clock_out: Option<Option<DateTime<Utc>>>,
    pub minutes_late: Option<i64>,
    pub total_minutes: Option<i64>,
}

impl Patch<TimeEntry> for TimeEntryPatch {
    fn is_empty(&self) -> bool {
        self.clock_out.is_none() && self.minutes_late.is_none() && self.total_minutes.is_none()
    }

    fn apply(self, target: &mut TimeEntry) {
        if let Some(clock_out) = self.clock_out {
            target.clock_out = clock_out;
        }
        if let Some(minutes_late) = self.minutes_late {
            target.minutes_late = minutes_late;
        }
        if let Some(total_minutes) = self.total_minutes {
            target.total_minutes = total_minutes;
        }
    }
}
