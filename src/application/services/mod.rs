pub mod sync_engine;
pub mod trigger;

pub use sync_engine::{SyncEngine, SyncOutcome, SyncReport};
pub use trigger::{SyncScheduler, SyncTrigger};
