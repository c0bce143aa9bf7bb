use regdesk_types::{EventId, RegistrationIndex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("event {0} not found")]
    EventNotFound(EventId),

    #[error("registration {0} is already cancelled")]
    AlreadyCancelled(RegistrationIndex),

    #[error("registration {0} is already recorded")]
    IndexCollision(RegistrationIndex),

    #[error("admission error: {0}")]
    Admission(#[from] regdesk_admission::AdmissionError),

    #[error("payment error: {0}")]
    Payment(#[from] regdesk_verification::PaymentError),

    #[error("audit error: {0}")]
    Audit(#[from] regdesk_audit::AuditError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
