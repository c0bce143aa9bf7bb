//! Fundamental types for the registration desk.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, money amounts, percentages, timestamps, event configuration,
//! submissions, registrations, payment state and audit entries.

pub mod amount;
pub mod audit;
pub mod error;
pub mod event;
pub mod ids;
pub mod mailer;
pub mod payment;
pub mod percent;
pub mod registration;
pub mod submission;
pub mod time;

pub use amount::Amount;
pub use audit::{AuditAction, AuditLogEntry, NewAuditEntry};
pub use error::TypesError;
pub use event::{EarlyBirdDiscount, EventConfig, RegistrationType, TeamPricing};
pub use ids::{AuditSeq, EventId, RegistrationIndex};
pub use mailer::Mailer;
pub use payment::{PaymentDecision, PaymentProof, PaymentStatus, DEFAULT_REJECTION_REASON};
pub use percent::Percent;
pub use registration::{FeeQuote, Registration, WaitlistEntry};
pub use submission::{Member, Submission};
pub use time::{Clock, SystemClock, Timestamp};
