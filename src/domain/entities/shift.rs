use super::record::{EntityKind, Patch, SyncRecord};
use crate::domain::value_objects::{ShiftStatus, SyncState};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub business_id: String,
    /// Unassigned shifts carry no staff id until published to someone.
    pub staff_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ShiftStatus,
    pub needs_coverage: bool,
    pub notes: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip, default)]
    pub sync_state: SyncState,
}

impl Shift {
    pub fn new(
        business_id: String,
        staff_id: Option<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_id,
            staff_id,
            date,
            start_time,
            end_time,
            status: ShiftStatus::Draft,
            needs_coverage: false,
            notes: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            sync_state: SyncState::PendingPush,
        }
    }
}

impl SyncRecord for Shift {
    const KIND: EntityKind = EntityKind::Shift;

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
pub struct ShiftPatch {
    pub staff_id: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: Option<ShiftStatus>,
    pub needs_coverage: Option<bool>,
    pub notes: Option<Option<String>>,
}

impl Patch<Shift> for ShiftPatch {
    fn is_empty(&self) -> bool {
        self.staff_id.is_none()
            && self.date.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.status.is_none()
            && self.needs_coverage.is_none()
            && self.notes.is_none()
    }

    fn apply(self, target: &mut Shift) {
        if let Some(staff_id) = self.staff_id {
            target.staff_id = staff_id;
        }
        if let Some(date) = self.date {
            target.date = date;
        }
        if let Some(start_time) = self.start_time {
            target.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            target.end_time = end_time;
        }
        if let Some(status) = self.status {
            target.status = status;
        }
        if let Some(needs_coverage) = self.needs_coverage {
            target.needs_coverage = needs_coverage;
        }
        if let Some(notes) = self.notes {
            target.notes = notes;
        }
    }
}
