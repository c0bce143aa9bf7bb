//! The [`EventDesk`]: every open event's admission book and payment ledger,
//! plus the audit store, clock, mailer and metrics they share.

use crate::metrics::DeskMetrics;
use crate::reminder::ReminderReport;
use crate::tracing_spans::{admission_span, payment_span};
use crate::{DeskConfig, DeskError};
use regdesk_admission::{Admission, AdmissionBook, AdmissionError, AdmissionSummary};
use regdesk_audit::{AuditStore, JournalAuditStore, MemoryAuditStore};
use regdesk_types::{
    AuditLogEntry, Clock, EventConfig, EventId, Mailer, PaymentDecision, PaymentProof,
    Registration, RegistrationIndex, Submission, SystemClock, WaitlistEntry,
};
use regdesk_verification::{PaymentError, PaymentLedger, PaymentTransition};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn};

/// Result of an admin cancellation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cancellation {
    /// The cancelled registration, with `cancelled_at` set.
    pub cancelled: Registration,
    /// The waitlist head that took over the freed seat, if anyone was waiting.
    pub promoted: Option<Registration>,
}

struct EventBook {
    admission: Mutex<AdmissionBook>,
    payments: PaymentLedger,
}

impl EventBook {
    fn admission(&self) -> MutexGuard<'_, AdmissionBook> {
        // The book mutates only after validation succeeded, so a poisoned
        // guard still protects consistent state.
        self.admission.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Hand a freshly seated registration to the payment ledger. If the
    /// ledger already holds its index the seat is released again, so no seat
    /// is left without a record.
    fn record(
        &self,
        admission: &mut AdmissionBook,
        registration: Registration,
    ) -> Result<Registration, DeskError> {
        let index = registration.registration_index;
        if self.payments.insert(registration.clone()) {
            Ok(registration)
        } else {
            admission.release_seat(index);
            Err(DeskError::IndexCollision(index))
        }
    }
}

/// Registration desk for any number of events.
///
/// Operations on one event serialize on that event's admission lock (payment
/// transitions take only the per-registration lock). Operations on different
/// events never contend: the event map is write-locked only while opening a
/// new event.
pub struct EventDesk {
    books: RwLock<HashMap<EventId, Arc<EventBook>>>,
    audit: Arc<dyn AuditStore>,
    clock: Arc<dyn Clock>,
    mailer: Arc<dyn Mailer>,
    metrics: Arc<DeskMetrics>,
}

impl EventDesk {
    pub fn new(audit: Arc<dyn AuditStore>, clock: Arc<dyn Clock>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            audit,
            clock,
            mailer,
            metrics: Arc::new(DeskMetrics::new()),
        }
    }

    /// Build a desk on the system clock, with the audit backend chosen by
    /// `config`: a journal when `audit_journal` is set, memory otherwise.
    pub fn from_config(config: &DeskConfig, mailer: Arc<dyn Mailer>) -> Result<Self, DeskError> {
        let audit: Arc<dyn AuditStore> = match &config.audit_journal {
            Some(path) => Arc::new(JournalAuditStore::open(path)?),
            None => {
                warn!("no audit journal configured, audit log is kept in memory only");
                Arc::new(MemoryAuditStore::new())
            }
        };
        Ok(Self::new(audit, Arc::new(SystemClock), mailer))
    }

    pub fn metrics(&self) -> Arc<DeskMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn audit(&self) -> Arc<dyn AuditStore> {
        Arc::clone(&self.audit)
    }

    fn book(&self, event_id: &EventId) -> Result<Arc<EventBook>, DeskError> {
        self.books
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(event_id)
            .cloned()
            .ok_or_else(|| DeskError::EventNotFound(event_id.clone()))
    }

    /// Ids of every open event, sorted.
    pub fn event_ids(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self
            .books
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Open an event, or replace the configuration of one already open.
    ///
    /// Reconfiguring keeps seats, counters and the waitlist. If the new
    /// capacity frees seats, waitlisted submissions are promoted into them.
    pub fn open_event(&self, config: EventConfig) -> Result<AdmissionSummary, DeskError> {
        let event_id = config.id.clone();
        let existing = self
            .books
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&event_id)
            .cloned();

        let book = match existing {
            Some(book) => book,
            None => {
                let mut fresh = AdmissionBook::new(config.clone())?;
                // The audit store may outlive earlier runs; never reissue an
                // index it already names.
                let last_issued = self
                    .audit
                    .list(&event_id)?
                    .iter()
                    .map(|entry| entry.registration_index)
                    .max();
                if let Some(last) = last_issued {
                    fresh.resume_after(last);
                }
                let mut books = self.books.write().unwrap_or_else(|e| e.into_inner());
                if let Some(raced) = books.get(&event_id) {
                    Arc::clone(raced)
                } else {
                    let book = Arc::new(EventBook {
                        admission: Mutex::new(fresh),
                        payments: PaymentLedger::new(event_id.clone(), Arc::clone(&self.audit)),
                    });
                    books.insert(event_id.clone(), Arc::clone(&book));
                    self.metrics.event_count.set(books.len() as i64);
                    info!(event = %event_id, capacity = config.capacity, "event opened");
                    let summary = book.admission().summary(self.clock.now());
                    return Ok(summary);
                }
            }
        };

        let _span = admission_span(&event_id, "reconfigure").entered();
        let mut admission = book.admission();
        admission.reconfigure(config)?;
        let now = self.clock.now();
        for promoted in admission.promote_while_free(now) {
            self.metrics.promotions.inc();
            book.record(&mut admission, promoted)?;
        }
        info!(event = %event_id, capacity = admission.config().capacity, "event reconfigured");
        Ok(admission.summary(now))
    }

    pub fn summary(&self, event_id: &EventId) -> Result<AdmissionSummary, DeskError> {
        let book = self.book(event_id)?;
        let summary = book.admission().summary(self.clock.now());
        Ok(summary)
    }

    pub fn event_config(&self, event_id: &EventId) -> Result<EventConfig, DeskError> {
        let book = self.book(event_id)?;
        let config = book.admission().config().clone();
        Ok(config)
    }

    /// Decide one registration attempt.
    ///
    /// A confirmed registration is handed to the payment ledger while the
    /// admission lock is still held, so it is visible to payment operations
    /// before any later admission on the same event.
    pub fn attempt_register(
        &self,
        event_id: &EventId,
        submission: Submission,
    ) -> Result<Admission, DeskError> {
        let book = self.book(event_id)?;
        let _span = admission_span(event_id, "register").entered();
        let mut admission = book.admission();
        let now = self.clock.now();

        match admission.attempt_register(submission, now) {
            Ok(Admission::Confirmed(registration)) => {
                self.metrics.registrations_confirmed.inc();
                info!(
                    index = %registration.registration_index,
                    total = %registration.fee.total,
                    status = %registration.payment_status,
                    "registration confirmed"
                );
                Ok(Admission::Confirmed(book.record(&mut admission, registration)?))
            }
            Ok(Admission::Waitlisted { rank }) => {
                self.metrics.registrations_waitlisted.inc();
                info!(rank, "registration waitlisted");
                Ok(Admission::Waitlisted { rank })
            }
            Err(e) => {
                self.metrics
                    .registrations_rejected
                    .with_label_values(&[rejection_label(&e)])
                    .inc();
                warn!(error = %e, "registration refused");
                Err(e.into())
            }
        }
    }

    /// Promote the waitlist head into a free seat, if both exist.
    pub fn promote_from_waitlist(
        &self,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DeskError> {
        let book = self.book(event_id)?;
        let _span = admission_span(event_id, "promote").entered();
        let mut admission = book.admission();
        match admission.promote_from_waitlist(self.clock.now()) {
            Some(registration) => {
                self.metrics.promotions.inc();
                Ok(Some(book.record(&mut admission, registration)?))
            }
            None => {
                debug!("nothing to promote");
                Ok(None)
            }
        }
    }

    /// Cancel a confirmed registration, free its seat and hand the seat to
    /// the waitlist head in the same critical section.
    pub fn cancel_registration(
        &self,
        event_id: &EventId,
        index: RegistrationIndex,
    ) -> Result<Cancellation, DeskError> {
        let book = self.book(event_id)?;
        let _span = admission_span(event_id, "cancel").entered();
        let mut admission = book.admission();
        let now = self.clock.now();

        let cancelled = book.payments.mark_cancelled(index, now).map_err(|e| match e {
            PaymentError::Cancelled(index) => DeskError::AlreadyCancelled(index),
            other => DeskError::Payment(other),
        })?;
        if !admission.release_seat(index) {
            warn!(%index, "cancelled registration held no seat");
        }
        self.metrics.cancellations.inc();

        let promoted = match admission.promote_from_waitlist(now) {
            Some(registration) => {
                self.metrics.promotions.inc();
                Some(book.record(&mut admission, registration)?)
            }
            None => None,
        };
        info!(
            %index,
            promoted = ?promoted.as_ref().map(|r| r.registration_index),
            "registration cancelled"
        );
        Ok(Cancellation {
            cancelled,
            promoted,
        })
    }

    /// Record a payment proof. `performed_by` defaults to the lead member's
    /// email.
    pub fn submit_proof(
        &self,
        event_id: &EventId,
        index: RegistrationIndex,
        proof: PaymentProof,
        performed_by: Option<&str>,
    ) -> Result<PaymentTransition, DeskError> {
        let book = self.book(event_id)?;
        let _span = payment_span(event_id, index, "submit").entered();
        let actor = match performed_by {
            Some(actor) => actor.to_string(),
            None => book
                .payments
                .get(index)
                .ok_or(PaymentError::NotFound(index))?
                .lead_email()
                .unwrap_or_default()
                .to_string(),
        };
        let transition = book
            .payments
            .submit_proof(index, proof, &actor, self.clock.now())?;
        self.metrics.proofs_submitted.inc();
        Ok(transition)
    }

    /// Apply an admin decision to a submitted proof.
    pub fn verify_payment(
        &self,
        event_id: &EventId,
        index: RegistrationIndex,
        decision: PaymentDecision,
        performed_by: &str,
    ) -> Result<PaymentTransition, DeskError> {
        let book = self.book(event_id)?;
        let _span = payment_span(event_id, index, "verify").entered();
        let approved = matches!(decision, PaymentDecision::Approve);
        let transition = book
            .payments
            .verify(index, decision, performed_by, self.clock.now())?;
        if approved {
            self.metrics.payments_approved.inc();
        } else {
            self.metrics.payments_rejected.inc();
        }
        Ok(transition)
    }

    pub fn registration(
        &self,
        event_id: &EventId,
        index: RegistrationIndex,
    ) -> Result<Registration, DeskError> {
        let book = self.book(event_id)?;
        let registration = book
            .payments
            .get(index)
            .ok_or(PaymentError::NotFound(index))?;
        Ok(registration)
    }

    /// Every registration of the event ordered by index, cancelled ones
    /// included.
    pub fn registrations(&self, event_id: &EventId) -> Result<Vec<Registration>, DeskError> {
        Ok(self.book(event_id)?.payments.snapshot())
    }

    pub fn waitlist(&self, event_id: &EventId) -> Result<Vec<WaitlistEntry>, DeskError> {
        let book = self.book(event_id)?;
        let entries = book.admission().waitlist().cloned().collect();
        Ok(entries)
    }

    /// Active registrations whose payment is not yet verified.
    pub fn pending_payments(&self, event_id: &EventId) -> Result<Vec<Registration>, DeskError> {
        let pending = self.book(event_id)?.payments.pending_payments();
        debug!(event = %event_id, count = pending.len(), "pending payments listed");
        Ok(pending)
    }

    /// Audit entries of the event in append order.
    pub fn payment_logs(&self, event_id: &EventId) -> Result<Vec<AuditLogEntry>, DeskError> {
        Ok(self.book(event_id)?.payments.audit_log()?)
    }

    /// Mail every member of every active registration of the event.
    ///
    /// The mailer is called without any desk lock held. A refused message is
    /// counted as failed and does not stop the run.
    pub fn send_reminders(
        &self,
        event_id: &EventId,
        subject: &str,
        text: &str,
    ) -> Result<ReminderReport, DeskError> {
        if subject.trim().is_empty() {
            return Err(DeskError::InvalidRequest("reminder subject is required".into()));
        }
        let registrations = self.registrations(event_id)?;

        let mut report = ReminderReport::default();
        for registration in registrations.iter().filter(|r| !r.is_cancelled()) {
            for member in &registration.members {
                let accepted = self.mailer.send(&member.email, subject, text);
                if !accepted {
                    warn!(
                        event = %event_id,
                        index = %registration.registration_index,
                        to = %member.email,
                        "reminder not accepted by mailer"
                    );
                }
                report.record(accepted);
            }
        }
        self.metrics
            .reminder_mails
            .with_label_values(&["sent"])
            .inc_by(report.sent as u64);
        self.metrics
            .reminder_mails
            .with_label_values(&["failed"])
            .inc_by(report.failed as u64);
        info!(event = %event_id, sent = report.sent, failed = report.failed, "reminders sent");
        Ok(report)
    }
}

fn rejection_label(error: &AdmissionError) -> &'static str {
    match error {
        AdmissionError::WindowClosed => "window_closed",
        AdmissionError::Validation(_) => "validation",
        AdmissionError::CapacityExceeded => "capacity_exceeded",
        AdmissionError::EventMismatch { .. } | AdmissionError::InvalidConfig(_) => "config",
    }
}
