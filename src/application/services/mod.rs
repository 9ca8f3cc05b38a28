pub mod failure_classifier;
pub mod remote_link_manager;
pub mod status_reporter;
pub mod topology_resolver;

pub use failure_classifier::{FailureClass, FailureClassifier};
pub use remote_link_manager::{LinkedRemote, RemoteChange, RemoteLinkError, RemoteLinkManager};
pub use status_reporter::{StatusReportError, SyncStatusReporter};
pub use topology_resolver::{find_git_root, RepoTopologyResolver, TopologyError};
