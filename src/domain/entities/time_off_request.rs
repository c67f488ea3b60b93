use super::record::{EntityKind, Patch, SyncRecord};
use crate::domain::value_objects::{RequestKind, RequestStatus, SyncState};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub id: String,
    pub business_id: String,
    pub staff_id: String,
    pub kind: RequestKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: RequestStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip, default)]
    pub sync_state: SyncState,
}

impl TimeOffRequest {
    pub fn new(
        business_id: String,
        staff_id: String,
        kind: RequestKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_id,
            staff_id,
            kind,
            start_date,
            end_date,
            reason,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            sync_state: SyncState::PendingPush,
        }
    }
}

impl SyncRecord for TimeOffRequest {
    const KIND: EntityKind = EntityKind::TimeOffRequest;

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
pub struct TimeOffRequestPatch {
    pub status: Option<RequestStatus>,
    pub reason: Option<Option<String>>,
}

impl Patch<TimeOffRequest> for TimeOffRequestPatch {
    fn is_empty(&self) -> bool {
        self.status.is_none() && self.reason.is_none()
    }

    fn apply(self, target: &mut TimeOffRequest) {
        if let Some(status) = self.status {
            target.status = status;
        }
        if let Some(reason) = self.reason {
            target.reason = reason;
        }
    }
}
