use super::record::{EntityKind, Patch, SyncRecord};
use crate::domain::value_objects::SyncState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The tenant root. Every other record hangs off a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub timezone: String,
    pub late_threshold_minutes: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip, default)]
    pub sync_state: SyncState,
}

impl Business {
    pub fn new(name: String, timezone: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            timezone,
            late_threshold_minutes: 10,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            sync_state: SyncState::PendingPush,
        }
    }
}

impl SyncRecord for Business {
    const KIND: EntityKind = EntityKind::Business;

    fn id(&self) -> &str {
        &self.id
    }

    fn business_id(&self) -> &str {
        // The businesses table is the tenant root.
        &self.id
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
pub struct BusinessPatch {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub late_threshold_minutes: Option<i64>,
}

impl Patch<Business> for BusinessPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.timezone.is_none() && self.late_threshold_minutes.is_none()
    }

    fn apply(self, target: &mut Business) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(timezone) = self.timezone {
            target.timezone = timezone;
        }
        if let Some(threshold) = self.late_threshold_minutes {
            target.late_threshold_minutes = threshold;
        }
    }
}
