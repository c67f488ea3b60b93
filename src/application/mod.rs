pub mod ports;
pub mod services;
pub mod session;

pub use services::{SyncEngine, SyncOutcome, SyncReport, SyncScheduler, SyncTrigger};
pub use session::SessionContext;
