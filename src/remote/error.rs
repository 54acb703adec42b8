//! Remote transport error types.

/// Why a remote call failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteFailure {
    /// The endpoint answered with a non-2xx status.
    #[error("server returned status {0}")]
    Status(u16),
    /// The request never got an answer (DNS, connect, TLS, reset...).
    #[error("network error: {0}")]
    Network(String),
    /// A 2xx response whose body was not JSON.
    #[error("invalid JSON response: {0}")]
    Decode(String),
    /// The outgoing payload could not be serialized.
    #[error("could not encode payload: {0}")]
    Encode(String),
}

/// A failed read or write against the remote endpoint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("remote action '{action}' failed: {cause}")]
pub struct RemoteError {
    pub action: &'static str,
    pub cause: RemoteFailure,
}

impl RemoteError {
    pub fn new(action: &'static str, cause: RemoteFailure) -> Self {
        Self { action, cause }
    }

    /// True when the server was reached and answered with `status`.
    pub fn is_status(&self, status: u16) -> bool {
        self.cause == RemoteFailure::Status(status)
    }
}
