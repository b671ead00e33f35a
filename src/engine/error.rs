use ulid::Ulid;

use crate::model::{ReservationStatus, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed time range. Non-retryable; the caller must fix the input.
    InvalidInterval { span: Span, reason: &'static str },
    /// Candidate overlaps an existing blocking reservation on the resource.
    Conflict { resource_id: Ulid, conflicting: Span },
    NotFound(Ulid),
    /// Lifecycle transition not permitted from the current status.
    InvalidTransition { id: Ulid, from: ReservationStatus },
    /// Per-resource commit lock could not be acquired in time. Retryable.
    LockTimeout(Ulid),
    LimitExceeded(&'static str),
    Storage(String),
}

impl EngineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::LockTimeout(_))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidInterval { span, reason } => {
                write!(f, "invalid interval [{}, {}): {reason}", span.start, span.end)
            }
            EngineError::Conflict { resource_id, conflicting } => {
                write!(
                    f,
                    "resource {resource_id} already booked over [{}, {})",
                    conflicting.start, conflicting.end
                )
            }
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::InvalidTransition { id, from } => {
                write!(f, "reservation {id} cannot leave status {from}")
            }
            EngineError::LockTimeout(id) => {
                write!(f, "timed out waiting for commit lock on resource {id}")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
