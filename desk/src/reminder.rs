//! Reminder dispatch.

use regdesk_types::Mailer;
use serde::Serialize;
use tracing::info;

/// Outcome of one reminder run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderReport {
    pub sent: usize,
    pub failed: usize,
}

impl ReminderReport {
    pub fn record(&mut self, accepted: bool) {
        if accepted {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// A [`Mailer`] that writes each message to the log instead of a transport.
///
/// The daemon uses this until a real transport is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, text: &str) -> bool {
        info!(to, subject, bytes = text.len(), "reminder mail");
        true
    }
}
