//! Per-event store of confirmed registrations and their payment state.

use crate::state::{on_submit, on_verify};
use crate::PaymentError;
use regdesk_audit::AuditStore;
use regdesk_types::{
    AuditAction, AuditLogEntry, EventId, NewAuditEntry, PaymentDecision, PaymentProof,
    PaymentStatus, Registration, RegistrationIndex, Timestamp,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{info, warn};

/// Outcome of a successful payment transition.
#[derive(Clone, Debug)]
pub struct PaymentTransition {
    /// The registration after the transition.
    pub registration: Registration,
    /// The audit entry recording it.
    pub entry: AuditLogEntry,
}

type Cell = Arc<Mutex<Registration>>;

/// Registrations of one event, each behind its own lock.
///
/// Transitions on different registrations run concurrently; transitions on
/// the same registration serialize, so each check-then-mutate is atomic.
/// A registration is only written after its audit entry has been appended;
/// a failed transition leaves both untouched.
pub struct PaymentLedger {
    event_id: EventId,
    registrations: RwLock<BTreeMap<RegistrationIndex, Cell>>,
    audit: Arc<dyn AuditStore>,
}

fn lock(cell: &Cell) -> MutexGuard<'_, Registration> {
    // Registrations are mutated only after every fallible step succeeded,
    // so a poisoned lock still holds a consistent record.
    cell.lock().unwrap_or_else(|e| e.into_inner())
}

impl PaymentLedger {
    pub fn new(event_id: EventId, audit: Arc<dyn AuditStore>) -> Self {
        Self {
            event_id,
            registrations: RwLock::new(BTreeMap::new()),
            audit,
        }
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Store a newly confirmed registration. Returns `false` and stores
    /// nothing if the index is already present.
    pub fn insert(&self, registration: Registration) -> bool {
        let mut map = self.registrations.write().unwrap_or_else(|e| e.into_inner());
        if map.contains_key(&registration.registration_index) {
            warn!(
                event = %self.event_id,
                index = %registration.registration_index,
                "refusing to overwrite existing registration"
            );
            return false;
        }
        map.insert(
            registration.registration_index,
            Arc::new(Mutex::new(registration)),
        );
        true
    }

    fn cell(&self, index: RegistrationIndex) -> Result<Cell, PaymentError> {
        self.registrations
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&index)
            .cloned()
            .ok_or(PaymentError::NotFound(index))
    }

    /// Record a payment proof for `index`.
    pub fn submit_proof(
        &self,
        index: RegistrationIndex,
        proof: PaymentProof,
        performed_by: &str,
        now: Timestamp,
    ) -> Result<PaymentTransition, PaymentError> {
        let cell = self.cell(index)?;
        let mut reg = lock(&cell);
        if reg.is_cancelled() {
            return Err(PaymentError::Cancelled(index));
        }
        let next = on_submit(reg.payment_status)?;

        let utr = proof.utr_number.trim();
        if utr.is_empty() {
            return Err(PaymentError::Validation("UTR number is required".into()));
        }
        let action = AuditAction::Submitted {
            utr_number: utr.to_string(),
        };
        let entry = self.audit.append(self.audit_entry(&reg, action, performed_by, now))?;

        let from = reg.payment_status;
        reg.payment_status = next;
        reg.payment_proof = Some(PaymentProof {
            utr_number: utr.to_string(),
            ..proof
        });
        reg.rejection_reason = None;
        info!(
            event = %self.event_id,
            %index,
            %from,
            to = %next,
            seq = %entry.seq,
            "payment proof submitted"
        );
        Ok(PaymentTransition {
            registration: reg.clone(),
            entry,
        })
    }

    /// Apply an admin decision to the proof submitted for `index`.
    pub fn verify(
        &self,
        index: RegistrationIndex,
        decision: PaymentDecision,
        performed_by: &str,
        now: Timestamp,
    ) -> Result<PaymentTransition, PaymentError> {
        let cell = self.cell(index)?;
        let mut reg = lock(&cell);
        if reg.is_cancelled() {
            return Err(PaymentError::Cancelled(index));
        }
        let next = on_verify(reg.payment_status, &decision)?;

        let rejection_reason = decision.rejection_reason();
        let action = match &rejection_reason {
            Some(reason) => AuditAction::Rejected {
                rejection_reason: reason.clone(),
            },
            None => AuditAction::Verified {
                utr_number: reg
                    .payment_proof
                    .as_ref()
                    .map(|p| p.utr_number.clone())
                    .unwrap_or_default(),
            },
        };
        let entry = self.audit.append(self.audit_entry(&reg, action, performed_by, now))?;

        reg.payment_status = next;
        reg.rejection_reason = rejection_reason;
        info!(
            event = %self.event_id,
            %index,
            to = %next,
            by = performed_by,
            seq = %entry.seq,
            "payment reviewed"
        );
        Ok(PaymentTransition {
            registration: reg.clone(),
            entry,
        })
    }

    /// Flag `index` as cancelled. Its record and index are kept.
    pub fn mark_cancelled(
        &self,
        index: RegistrationIndex,
        now: Timestamp,
    ) -> Result<Registration, PaymentError> {
        let cell = self.cell(index)?;
        let mut reg = lock(&cell);
        if reg.is_cancelled() {
            return Err(PaymentError::Cancelled(index));
        }
        reg.cancelled_at = Some(now);
        Ok(reg.clone())
    }

    pub fn get(&self, index: RegistrationIndex) -> Option<Registration> {
        let cell = self.cell(index).ok()?;
        let reg = lock(&cell).clone();
        Some(reg)
    }

    /// All registrations ordered by index.
    pub fn snapshot(&self) -> Vec<Registration> {
        let cells: Vec<Cell> = self
            .registrations
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        cells.iter().map(|cell| lock(cell).clone()).collect()
    }

    /// Active registrations whose payment is not yet verified.
    pub fn pending_payments(&self) -> Vec<Registration> {
        self.snapshot()
            .into_iter()
            .filter(|r| !r.is_cancelled() && r.payment_status != PaymentStatus::Verified)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Audit entries for this event in append order.
    pub fn audit_log(&self) -> Result<Vec<AuditLogEntry>, PaymentError> {
        Ok(self.audit.list(&self.event_id)?)
    }

    fn audit_entry(
        &self,
        reg: &Registration,
        action: AuditAction,
        performed_by: &str,
        now: Timestamp,
    ) -> NewAuditEntry {
        NewAuditEntry {
            event_id: self.event_id.clone(),
            timestamp: now,
            registration_index: reg.registration_index,
            team_name: reg.team_name.clone(),
            lead_email: reg.lead_email().map(str::to_string),
            action,
            performed_by: performed_by.to_string(),
        }
    }
}
