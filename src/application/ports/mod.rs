pub mod connectivity;
pub mod cursor_store;
pub mod remote_store;
pub mod replica_store;

pub use connectivity::{ConnectivityProbe, SharedConnectivity};
pub use cursor_store::CursorStore;
pub use remote_store::RemoteStore;
pub use replica_store::{PendingRecord, PushedVersion, ReplicaStore};
