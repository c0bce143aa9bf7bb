//! The in-memory arena shared by both backends.

use regdesk_types::{AuditLogEntry, AuditSeq, EventId, NewAuditEntry};
use std::collections::HashMap;

/// Entries in append order plus a per-event index of arena positions.
///
/// Sequence numbers start at 1 and equal `position + 1`.
#[derive(Debug, Default)]
pub struct AuditArena {
    entries: Vec<AuditLogEntry>,
    by_event: HashMap<EventId, Vec<usize>>,
}

impl AuditArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next appended entry will receive.
    pub fn next_seq(&self) -> AuditSeq {
        AuditSeq::new(self.entries.len() as u64 + 1)
    }

    /// Stamp an entry with the next sequence number without recording it.
    pub fn stamp(&self, entry: NewAuditEntry) -> AuditLogEntry {
        AuditLogEntry::from_new(self.next_seq(), entry)
    }

    /// Record a stamped entry. The entry's sequence number must be
    /// [`next_seq`](Self::next_seq); anything else is refused.
    pub fn push(&mut self, entry: AuditLogEntry) -> Result<(), AuditSeq> {
        let expected = self.next_seq();
        if entry.seq != expected {
            return Err(expected);
        }
        let pos = self.entries.len();
        self.by_event
            .entry(entry.event_id.clone())
            .or_default()
            .push(pos);
        self.entries.push(entry);
        Ok(())
    }

    pub fn list(&self, event_id: &EventId) -> Vec<AuditLogEntry> {
        self.by_event
            .get(event_id)
            .map(|positions| positions.iter().map(|&p| self.entries[p].clone()).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, seq: AuditSeq) -> Option<&AuditLogEntry> {
        let pos = seq.get().checked_sub(1)?;
        self.entries.get(usize::try_from(pos).ok()?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use regdesk_types::{AuditAction, RegistrationIndex, Timestamp};

    pub(crate) fn new_entry(event: &str, idx: u64, utr: &str) -> NewAuditEntry {
        NewAuditEntry {
            event_id: EventId::new(event).unwrap(),
            timestamp: Timestamp::new(1_000 + idx),
            registration_index: RegistrationIndex::new(idx),
            team_name: None,
            lead_email: Some(format!("lead{idx}@example.com")),
            action: AuditAction::Submitted {
                utr_number: utr.to_string(),
            },
            performed_by: "participant".into(),
        }
    }

    #[test]
    fn sequence_numbers_start_at_one_and_increase() {
        let mut arena = AuditArena::new();
        for i in 1..=3 {
            let e = arena.stamp(new_entry("e1", i, "UTR"));
            assert_eq!(e.seq, AuditSeq::new(i));
            arena.push(e).unwrap();
        }
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.get(AuditSeq::new(2)).unwrap().registration_index.get(), 2);
        assert!(arena.get(AuditSeq::new(0)).is_none());
    }

    #[test]
    fn push_refuses_out_of_order_seq() {
        let mut arena = AuditArena::new();
        let stale = arena.stamp(new_entry("e1", 1, "A"));
        arena.push(arena.stamp(new_entry("e1", 2, "B"))).unwrap();
        assert_eq!(arena.push(stale), Err(AuditSeq::new(2)));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn list_filters_by_event_in_append_order() {
        let mut arena = AuditArena::new();
        arena.push(arena.stamp(new_entry("a", 1, "A1"))).unwrap();
        arena.push(arena.stamp(new_entry("b", 1, "B1"))).unwrap();
        arena.push(arena.stamp(new_entry("a", 2, "A2"))).unwrap();

        let a = arena.list(&EventId::new("a").unwrap());
        assert_eq!(a.len(), 2);
        assert!(a[0].seq < a[1].seq);
        assert_eq!(a[1].registration_index.get(), 2);
        assert!(arena.list(&EventId::new("missing").unwrap()).is_empty());
    }
}
