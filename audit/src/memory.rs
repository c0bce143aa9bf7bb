//! In-memory audit store.

use crate::{AuditArena, AuditError, AuditStore};
use regdesk_types::{AuditLogEntry, EventId, NewAuditEntry};
use std::sync::{Mutex, MutexGuard};

/// Audit store backed only by the in-memory arena. Contents are lost on
/// restart.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    arena: Mutex<AuditArena>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn arena(&self) -> MutexGuard<'_, AuditArena> {
        // The arena is only touched after an entry is fully built, so a
        // poisoned lock still guards a consistent arena.
        self.arena.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AuditStore for MemoryAuditStore {
    fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, AuditError> {
        let mut arena = self.arena();
        let stamped = arena.stamp(entry);
        arena
            .push(stamped.clone())
            .map_err(|expected| AuditError::Corrupt {
                line: expected.get() as usize,
                reason: "sequence gap in memory arena".into(),
            })?;
        tracing::debug!(
            seq = %stamped.seq,
            event = %stamped.event_id,
            action = stamped.action.name(),
            "audit entry appended"
        );
        Ok(stamped)
    }

    fn list(&self, event_id: &EventId) -> Result<Vec<AuditLogEntry>, AuditError> {
        Ok(self.arena().list(event_id))
    }

    fn len(&self) -> usize {
        self.arena().len()
    }
}
