//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the desk (clock, outbound mail) are abstracted
//! behind traits in `regdesk-types`. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod mailer;

pub use clock::NullClock;
pub use mailer::{NullMailer, SentMail};
