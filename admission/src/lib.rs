//! Admission control for event registrations.
//!
//! An [`AdmissionBook`] owns the admission state of one event: the set of
//! occupied seats, the FIFO waitlist, the registration index counter and the
//! early-bird counter. It is a plain single-threaded state machine; callers
//! serialize access per event (the desk wraps each book in a mutex), which
//! makes every check-and-append below one atomic unit.

pub mod book;
pub mod error;
pub mod validation;

pub use book::{Admission, AdmissionBook, AdmissionSummary};
pub use error::AdmissionError;
pub use validation::validate_submission;
