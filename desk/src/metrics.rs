//! Prometheus metrics for the registration desk.
//!
//! [`DeskMetrics`] owns a dedicated [`Registry`] that the RPC `/metrics`
//! endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Central collection of all desk-level Prometheus metrics.
pub struct DeskMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Admission ───────────────────────────────────────────────────────
    /// Registrations that obtained a seat directly.
    pub registrations_confirmed: IntCounter,
    /// Registrations queued on a waitlist.
    pub registrations_waitlisted: IntCounter,
    /// Registration attempts refused, labelled by reason.
    pub registrations_rejected: IntCounterVec,
    /// Waitlist entries moved into a seat.
    pub promotions: IntCounter,
    /// Registrations cancelled by an admin.
    pub cancellations: IntCounter,

    // ── Payments ────────────────────────────────────────────────────────
    /// Payment proofs accepted.
    pub proofs_submitted: IntCounter,
    /// Payments approved.
    pub payments_approved: IntCounter,
    /// Payments rejected.
    pub payments_rejected: IntCounter,

    // ── Reminders ───────────────────────────────────────────────────────
    /// Reminder mails, labelled `sent` or `failed`.
    pub reminder_mails: IntCounterVec,

    /// Number of events currently open on this desk.
    pub event_count: IntGauge,
}

impl DeskMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let registrations_confirmed = register_int_counter_with_registry!(
            Opts::new(
                "regdesk_registrations_confirmed_total",
                "Registrations confirmed directly into a seat"
            ),
            registry
        )
        .expect("failed to register registrations_confirmed counter");

        let registrations_waitlisted = register_int_counter_with_registry!(
            Opts::new(
                "regdesk_registrations_waitlisted_total",
                "Registrations queued on a waitlist"
            ),
            registry
        )
        .expect("failed to register registrations_waitlisted counter");

        let registrations_rejected = register_int_counter_vec_with_registry!(
            Opts::new(
                "regdesk_registrations_rejected_total",
                "Registration attempts refused"
            ),
            &["reason"],
            registry
        )
        .expect("failed to register registrations_rejected counter");

        let promotions = register_int_counter_with_registry!(
            Opts::new(
                "regdesk_waitlist_promotions_total",
                "Waitlist entries promoted into a seat"
            ),
            registry
        )
        .expect("failed to register promotions counter");

        let cancellations = register_int_counter_with_registry!(
            Opts::new(
                "regdesk_cancellations_total",
                "Registrations cancelled by an admin"
            ),
            registry
        )
        .expect("failed to register cancellations counter");

        let proofs_submitted = register_int_counter_with_registry!(
            Opts::new(
                "regdesk_payment_proofs_submitted_total",
                "Payment proofs accepted for review"
            ),
            registry
        )
        .expect("failed to register proofs_submitted counter");

        let payments_approved = register_int_counter_with_registry!(
            Opts::new("regdesk_payments_approved_total", "Payments approved"),
            registry
        )
        .expect("failed to register payments_approved counter");

        let payments_rejected = register_int_counter_with_registry!(
            Opts::new("regdesk_payments_rejected_total", "Payments rejected"),
            registry
        )
        .expect("failed to register payments_rejected counter");

        let reminder_mails = register_int_counter_vec_with_registry!(
            Opts::new("regdesk_reminder_mails_total", "Reminder mails dispatched"),
            &["outcome"],
            registry
        )
        .expect("failed to register reminder_mails counter");

        let event_count = register_int_gauge_with_registry!(
            Opts::new("regdesk_events", "Events open on this desk"),
            registry
        )
        .expect("failed to register event_count gauge");

        Self {
            registry,
            registrations_confirmed,
            registrations_waitlisted,
            registrations_rejected,
            promotions,
            cancellations,
            proofs_submitted,
            payments_approved,
            payments_rejected,
            reminder_mails,
            event_count,
        }
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for DeskMetrics {
    fn default() -> Self {
        Self::new()
    }
}
