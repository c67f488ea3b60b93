pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::{
    SessionContext, SyncEngine, SyncOutcome, SyncReport, SyncScheduler, SyncTrigger,
};
pub use infrastructure::{ConnectionPool, MemoryRemoteStore, SqliteCursorStore, SqliteLocalStore};
pub use shared::{AppConfig, AppError, Result};

/// Install the default tracing subscriber. Filter override via
/// `RUST_LOG`, e.g. `RUST_LOG=shiftsync=trace`.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiftsync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
