//! Validated value types shared across the crate

pub mod branch_name;
pub mod remote_url;
pub mod subtree_prefix;

pub use branch_name::{BranchName, BranchNameError};
pub use remote_url::{RemoteUrl, RemoteUrlError};
pub use subtree_prefix::{SubtreePrefix, SubtreePrefixError};
