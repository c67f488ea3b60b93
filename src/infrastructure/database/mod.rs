pub mod connection_pool;
pub mod cursor_store;
mod entity;
mod local_store;
mod mapper;
mod queries;

pub use connection_pool::ConnectionPool;
pub use cursor_store::SqliteCursorStore;
pub use local_store::SqliteLocalStore;
