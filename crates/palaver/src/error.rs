//! Driver error types.

/// Errors surfaced by session calls and the session facade.
///
/// Cancellation is its own variant: a cancelled call resolves as
/// `Cancelled`, never as a backend failure, so callers and interceptors
/// can tell the two apart.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The call was cancelled before it produced a result.
    #[error("session call cancelled")]
    Cancelled,

    /// The backend rejected or failed the operation.
    #[error("backend error: {0}")]
    Backend(String),

    /// Operation on a closed session.
    #[error("session is closed")]
    SessionClosed,

    /// `call` invoked more than once on the same call instance.
    #[error("session call already invoked")]
    AlreadyCalled,

    /// The request handed to an action was the wrong category.
    #[error("request does not match this action: expected {expected}")]
    RequestMismatch { expected: &'static str },

    /// The action produced a response of the wrong category.
    #[error("unexpected response shape: expected {expected}")]
    UnexpectedResponse { expected: &'static str },

    /// The call went away without delivering a result.
    #[error("session call dropped before completing")]
    CallDropped,
}

impl DriverError {
    pub fn backend(message: impl Into<String>) -> Self {
        DriverError::Backend(message.into())
    }

    /// True for the cancellation variant specifically.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DriverError::Cancelled)
    }
}
