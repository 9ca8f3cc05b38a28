use crate::common::error::SyncError;

/// Result alias used by every sync operation
pub type SyncResult<T> = Result<T, SyncError>;
