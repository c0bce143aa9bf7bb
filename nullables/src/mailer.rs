//! Nullable mailer: records messages instead of sending them.

use regdesk_types::Mailer;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// A mailer that keeps every accepted message in memory.
///
/// Addresses registered with [`fail_for`](Self::fail_for) are refused, to
/// exercise partial-failure paths.
#[derive(Debug, Default)]
pub struct NullMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: Mutex<HashSet<String>>,
}

impl NullMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future send to `address` fail.
    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    /// Messages accepted so far, in send order.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for NullMailer {
    fn send(&self, to: &str, subject: &str, text: &str) -> bool {
        if self.failing.lock().unwrap().contains(to) {
            return false;
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
        });
        true
    }
}
