pub mod request;
pub mod role;
pub mod shift_status;
pub mod sync_state;

pub use request::{RequestKind, RequestStatus};
pub use role::StaffRole;
pub use shift_status::ShiftStatus;
pub use sync_state::SyncState;
