use thiserror::Error;

/// Unified error type for query protocol faults.
///
/// Business-level outcomes (pending approval, no connection, backend
/// rejection) are never errors; they are carried as values in
/// [`crate::StartOutcome`] and [`crate::RunOutcome`]. These variants cover
/// genuine faults only: the network exchange failed or the backend answered
/// with something the protocol cannot interpret.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The submission exchange itself failed (network error, connection
    /// refused, request could not be sent)
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// The backend answered the submission with a body the client cannot
    /// interpret
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// The result channel could not be opened
    #[error("Result channel failed: {0}")]
    ChannelFailed(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
