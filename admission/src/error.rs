use regdesk_types::{EventId, TypesError};
use thiserror::Error;

/// Why a registration attempt was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("registration window is closed")]
    WindowClosed,

    #[error("invalid submission: {0}")]
    Validation(String),

    #[error("event is at capacity and no waitlist is available")]
    CapacityExceeded,

    #[error("configuration is for event {got}, expected {expected}")]
    EventMismatch { expected: EventId, got: EventId },

    #[error(transparent)]
    InvalidConfig(#[from] TypesError),
}
