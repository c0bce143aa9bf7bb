//! Payment verification for confirmed registrations.
//!
//! Priced registrations start in `Pending`. The participant submits a proof
//! (`Submitted`); an admin approves it (`Verified`, terminal) or rejects it
//! (`Rejected`, after which the participant may resubmit). Free
//! registrations sit in `NoPaymentRequired` and never move.
//!
//! The transition rules are pure functions in [`state`]; the
//! [`PaymentLedger`] applies them to stored registrations, one lock per
//! registration, and writes one audit entry per successful transition.

pub mod error;
pub mod ledger;
pub mod state;

pub use error::PaymentError;
pub use ledger::{PaymentLedger, PaymentTransition};
pub use state::{on_submit, on_verify};
