use tr_core::ParticipantId;

use crate::stage::Stage;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the session engine.
///
/// Duplicate or out-of-stage local actions are deliberately NOT errors;
/// they are silent no-ops. These variants cover programming errors and
/// bad identifiers.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `advance` was invoked on behalf of a stage that is not active.
    #[error("stage violation: advance from {found} while {expected} is active")]
    StageViolation {
        /// The stage that is actually active.
        expected: Stage,
        /// The stage the caller claimed to own.
        found: Stage,
    },

    /// A ballot or lookup named a recommendation absent from the dataset.
    #[error("unknown recommendation: \"{0}\"")]
    UnknownRecommendation(String),

    /// A consumption assignment named a participant absent from the session.
    #[error("unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    /// A settlement amount was negative or not finite.
    #[error("invalid amount for {field}: {value}")]
    InvalidAmount {
        /// Which category total was rejected.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
}
