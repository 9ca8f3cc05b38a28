pub mod subtree_sync;

pub use subtree_sync::{LinkRequest, SubtreeSyncEngine};
