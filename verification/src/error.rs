use regdesk_audit::AuditError;
use regdesk_types::{PaymentStatus, RegistrationIndex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("registration {0} not found")]
    NotFound(RegistrationIndex),

    #[error("cannot review payment in state {from}")]
    InvalidStateTransition { from: PaymentStatus },

    #[error("payment is already verified")]
    AlreadyVerified,

    #[error("registration requires no payment")]
    NoPaymentExpected,

    #[error("invalid payment proof: {0}")]
    Validation(String),

    #[error("registration {0} is cancelled")]
    Cancelled(RegistrationIndex),

    #[error("audit log error: {0}")]
    Audit(#[from] AuditError),
}
