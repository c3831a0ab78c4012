//! Client error types

/// Errors from the endpoint resolver collaborator
///
/// All of these are recovered by the session's unbounded timed retry; none
/// is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("gateway endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("credential rejected (status {0})")]
    Rejected(u16),

    #[error("gateway endpoint response missing url field")]
    MissingUrl,
}

/// Errors surfaced by the client facade
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing bot token")]
    MissingToken,
}
