use thiserror::Error;

/// Failures of the host messaging channel itself.
///
/// These are terminal for the current session: the worker escalates
/// them to the liveness supervisor instead of retrying.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("host channel disconnected: {0}")]
    Disconnected(String),
    #[error("no response from host channel")]
    NoResponse,
}

/// Failures of a single transcript fetch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The messaging channel is gone; not retryable.
    #[error(transparent)]
    Channel(#[from] ChannelError),
    /// The host reached the gateway but the request was refused
    /// (auth, unknown meeting, rate limit). Retryable; the cycle is
    /// skipped and polling continues.
    #[error("transcript request rejected: {0}")]
    Rejected(String),
}

/// Errors surfaced by [`crate::SyncEngine`] entry points.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no sync session for meeting {0}")]
    UnknownSession(String),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("bot config update rejected: {0}")]
    ConfigRejected(String),
}
