//! Outbound email capability.

/// Sends one plain-text email. Returns whether the message was accepted for
/// delivery. Transport failures are reported as `false`, never as panics.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, text: &str) -> bool;
}
