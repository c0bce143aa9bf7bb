//! Audit trail entries for payment verification.

use serde::{Deserialize, Serialize};

use crate::{AuditSeq, EventId, RegistrationIndex, Timestamp};

/// What happened to a registration's payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AuditAction {
    Submitted {
        #[serde(rename = "utrNumber")]
        utr_number: String,
    },
    Verified {
        #[serde(rename = "utrNumber")]
        utr_number: String,
    },
    Rejected {
        #[serde(rename = "rejectionReason")]
        rejection_reason: String,
    },
}

impl AuditAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submitted",
            Self::Verified { .. } => "verified",
            Self::Rejected { .. } => "rejected",
        }
    }
}

/// An entry before the audit store has assigned it a position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub event_id: EventId,
    pub timestamp: Timestamp,
    pub registration_index: RegistrationIndex,
    pub team_name: Option<String>,
    pub lead_email: Option<String>,
    pub action: AuditAction,
    pub performed_by: String,
}

/// An immutable, appended audit record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub seq: AuditSeq,
    pub event_id: EventId,
    pub timestamp: Timestamp,
    pub registration_index: RegistrationIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_email: Option<String>,
    #[serde(flatten)]
    pub action: AuditAction,
    pub performed_by: String,
}

impl AuditLogEntry {
    pub fn from_new(seq: AuditSeq, entry: NewAuditEntry) -> Self {
        Self {
            seq,
            event_id: entry.event_id,
            timestamp: entry.timestamp,
            registration_index: entry.registration_index,
            team_name: entry.team_name,
            lead_email: entry.lead_email,
            action: entry.action,
            performed_by: entry.performed_by,
        }
    }
}
