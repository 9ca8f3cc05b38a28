//! Domain entities for paper subtree synchronization

pub mod remote_binding;
pub mod sync_outcome;
pub mod sync_settings;
pub mod sync_status;
pub mod topology;

pub use remote_binding::RemoteBinding;
pub use sync_outcome::{SyncAction, SyncOperation, SyncOutcome};
pub use sync_settings::SyncSettings;
pub use sync_status::{AheadBehind, SyncState, SyncStatusSnapshot};
pub use topology::{RepoTopology, TopologyMode};
