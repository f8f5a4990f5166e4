use crate::types::SessionPhase;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while operating on a session.
///
/// None of these are fatal: a failed operation leaves the stored session
/// unchanged. `StoreConflict` is transient (a lost race on a conditional
/// update) and is retried a bounded number of times by the service before
/// being surfaced.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no session with that code")]
    SessionNotFound,

    #[error("the session has already started")]
    SessionAlreadyStarted,

    #[error("the name \"{0}\" is already taken in this session")]
    NameTaken(String),

    #[error("{required} players required, only {actual} in the lobby")]
    InsufficientPlayers { required: usize, actual: usize },

    #[error("cannot {event} while the session is in {phase:?}")]
    InvalidPhase {
        phase: SessionPhase,
        event: &'static str,
    },

    #[error("could not allocate an unused join code")]
    CodeExhausted,

    #[error("session was modified concurrently, try again")]
    StoreConflict,
}

impl SessionError {
    /// Stable wire code for the protocol's Error message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionAlreadyStarted => "SESSION_ALREADY_STARTED",
            Self::NameTaken(_) => "NAME_TAKEN",
            Self::InsufficientPlayers { .. } => "INSUFFICIENT_PLAYERS",
            Self::InvalidPhase { .. } => "INVALID_PHASE",
            Self::CodeExhausted => "CODE_EXHAUSTED",
            Self::StoreConflict => "STORE_CONFLICT",
        }
    }
}
