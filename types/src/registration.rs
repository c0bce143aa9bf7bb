//! Confirmed registrations and waitlist entries.

use serde::{Deserialize, Serialize};

use crate::{
    Amount, EventId, Member, PaymentProof, PaymentStatus, RegistrationIndex, Submission,
    Timestamp,
};

/// Fee breakdown for one registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub base: Amount,
    pub discount: Amount,
    pub gst: Amount,
    pub total: Amount,
    /// Whether this quote consumed an early-bird slot.
    pub early_bird_applied: bool,
}

impl FeeQuote {
    pub const FREE: Self = Self {
        base: Amount::ZERO,
        discount: Amount::ZERO,
        gst: Amount::ZERO,
        total: Amount::ZERO,
        early_bird_applied: false,
    };
}

/// A confirmed seat at an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub event_id: EventId,
    pub registration_index: RegistrationIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub members: Vec<Member>,
    pub registered_at: Timestamp,
    /// Set when the seat was obtained through waitlist promotion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waitlisted_at: Option<Timestamp>,
    pub fee: FeeQuote,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<PaymentProof>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<Timestamp>,
}

impl Registration {
    pub fn lead_email(&self) -> Option<&str> {
        self.members.first().map(|m| m.email.as_str())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

/// A submission held while the event is full.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    /// Per-event arrival counter; defines FIFO order.
    pub arrival: u64,
    pub queued_at: Timestamp,
    pub submission: Submission,
}
