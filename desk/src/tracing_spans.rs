//! Pre-built [`tracing::Span`] constructors for desk operations.
//!
//! Consistent span names and field sets make it easy to filter and
//! correlate traces for a single event or registration.

use regdesk_types::{EventId, RegistrationIndex};
use tracing::{info_span, Span};

/// Span covering one admission decision (register, promote, cancel).
pub fn admission_span(event: &EventId, op: &str) -> Span {
    info_span!("admission", event = %event, op = %op)
}

/// Span covering one payment transition on a registration.
pub fn payment_span(event: &EventId, index: RegistrationIndex, op: &str) -> Span {
    info_span!("payment_transition", event = %event, index = %index, op = %op)
}

/// Span covering a single HTTP request handled by the RPC server.
pub fn rpc_span(action: &str) -> Span {
    info_span!("rpc", action = %action)
}
