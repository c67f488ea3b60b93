pub mod attendance;
pub mod conflict;
pub mod entities;
pub mod payroll;
pub mod value_objects;

pub use conflict::{Winner, resolve};
pub use entities::{
    Business, BusinessPatch, EntityKind, Membership, MembershipPatch, Patch, ReplicaMeta, Shift,
    ShiftPatch, StaffProfile, StaffProfilePatch, SyncRecord, TimeEntry, TimeEntryPatch,
    TimeOffRequest, TimeOffRequestPatch,
};
pub use value_objects::{RequestKind, RequestStatus, ShiftStatus, StaffRole, SyncState};
