use super::record::{EntityKind, Patch, SyncRecord};
use crate::domain::value_objects::{StaffRole, SyncState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub id: String,
    pub business_id: String,
    /// Set once the staff member links an authenticated user account.
    pub user_id: Option<String>,
    pub name: String,
    pub role: StaffRole,
    pub hourly_rate: f64,
    pub active: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip, default)]
    pub sync_state: SyncState,
}

impl StaffProfile {
    pub fn new(business_id: String, name: String, role: StaffRole, hourly_rate: f64) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_id,
            user_id: None,
            name,
            role,
            hourly_rate,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            sync_state: SyncState::PendingPush,
        }
    }
}

impl SyncRecord for StaffProfile {
    const KIND: EntityKind = EntityKind::StaffProfile;

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
pub struct StaffProfilePatch {
    pub user_id: Option<Option<String>>,
    pub name: Option<String>,
    pub role: Option<StaffRole>,
    pub hourly_rate: Option<f64>,
    pub active: Option<bool>,
}

impl Patch<StaffProfile> for StaffProfilePatch {
    fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.name.is_none()
            && self.role.is_none()
            && self.hourly_rate.is_none()
            && self.active.is_none()
    }

    fn apply(self, target: &mut StaffProfile) {
        if let Some(user_id) = self.user_id {
            target.user_id = user_id;
        }
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(role) = self.role {
            target.role = role;
        }
        if let Some(rate) = self.hourly_rate {
            target.hourly_rate = rate;
        }
        if let Some(active) = self.active {
            target.active = active;
        }
    }
}
