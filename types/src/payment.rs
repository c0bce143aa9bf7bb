//! Payment lifecycle types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, Timestamp};

/// Reason stored when an admin rejects a proof without giving one.
pub const DEFAULT_REJECTION_REASON: &str = "Payment verification failed";

/// Where a registration stands in the payment lifecycle.
///
/// `NoPaymentRequired` and `Verified` are terminal. `Rejected` allows the
/// participant to resubmit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    NoPaymentRequired,
    Pending,
    Submitted,
    Verified,
    Rejected,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoPaymentRequired | Self::Verified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPaymentRequired => "NoPaymentRequired",
            Self::Pending => "Pending",
            Self::Submitted => "Submitted",
            Self::Verified => "Verified",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evidence of payment supplied by the participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// Unique Transaction Reference from the bank.
    pub utr_number: String,
    pub amount_paid: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_notes: Option<String>,
}

impl PaymentProof {
    pub fn new(utr_number: impl Into<String>, amount_paid: Amount) -> Self {
        Self {
            utr_number: utr_number.into(),
            amount_paid,
            screenshot_data: None,
            transaction_date: None,
            paid_from: None,
            user_notes: None,
        }
    }
}

/// An admin's verdict on a submitted proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentDecision {
    Approve,
    Reject { reason: Option<String> },
}

impl PaymentDecision {
    /// The reason to store for a rejection, falling back to the default when
    /// the admin left it blank.
    pub fn rejection_reason(&self) -> Option<String> {
        match self {
            Self::Approve => None,
            Self::Reject { reason } => Some(
                reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .unwrap_or(DEFAULT_REJECTION_REASON)
                    .to_string(),
            ),
        }
    }
}
