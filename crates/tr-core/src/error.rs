use crate::participant::ParticipantId;

/// Alias for `Result<T, TrError>`.
pub type TrResult<T> = Result<T, TrError>;

/// Errors raised while loading or manipulating session data.
#[derive(Debug, thiserror::Error)]
pub enum TrError {
    /// The dataset document could not be read from disk.
    #[error("failed to read dataset: {0}")]
    DatasetIo(#[from] std::io::Error),

    /// The dataset document is not valid JSON or is missing a required field.
    #[error("malformed dataset: {0}")]
    DatasetParse(#[from] serde_json::Error),

    /// The dataset parsed but its content is inconsistent.
    #[error("invalid dataset: {0}")]
    Validation(String),

    /// The requested participant does not exist in the session.
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),
}
