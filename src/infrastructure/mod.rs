pub mod database;
pub mod remote;

pub use database::{ConnectionPool, SqliteCursorStore, SqliteLocalStore};
pub use remote::MemoryRemoteStore;
