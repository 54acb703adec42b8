//! Sync error types.

use crate::remote::RemoteError;
use crate::store::StoreError;

/// Errors that can occur during a sync pass.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No remote endpoint is configured
    #[error("Sync not configured. Set sync.endpoint in the config file or POSSYNC_ENDPOINT.")]
    NotConfigured,

    /// HTTP failure talking to the remote endpoint
    #[error(transparent)]
    Transport(#[from] RemoteError),

    /// The remote answered, but not with the shape we expected
    #[error("Invalid remote {entity}: {detail}")]
    InvalidRemoteShape { entity: &'static str, detail: String },

    /// A singleton record (settings) is missing where it is required
    #[error("No {0} found")]
    NotFound(&'static str),

    /// Local storage failed
    #[error("Local store error: {0}")]
    LocalStore(#[from] StoreError),
}

impl SyncError {
    pub(crate) fn invalid_shape(entity: &'static str, detail: impl Into<String>) -> Self {
        SyncError::InvalidRemoteShape {
            entity,
            detail: detail.into(),
        }
    }
}
