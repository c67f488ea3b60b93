use super::record::{EntityKind, Patch, SyncRecord};
use crate::domain::value_objects::{StaffRole, SyncState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Links an authenticated user to a business with a role. Unique per
/// (user, business).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub business_id: String,
    pub user_id: String,
    pub role: StaffRole,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip, default)]
    pub sync_state: SyncState,
}

impl Membership {
    pub fn new(business_id: String, user_id: String, role: StaffRole) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_id,
            user_id,
            role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            sync_state: SyncState::PendingPush,
        }
    }
}

impl SyncRecord for Membership {
    const KIND: EntityKind = EntityKind::Membership;

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
pub struct MembershipPatch {
    pub role: Option<StaffRole>,
}

impl Patch<Membership> for MembershipPatch {
    fn is_empty(&self) -> bool {
        self.role.is_none()
    }

    fn apply(self, target: &mut Membership) {
        if let Some(role) = self.role {
            target.role = role;
        }
    }
}
