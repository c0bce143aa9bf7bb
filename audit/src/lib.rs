//! Append-only audit log.
//!
//! Every payment-verification action is recorded here exactly once. Entries
//! live in an arena indexed by a monotonically increasing [`AuditSeq`]; they
//! are never mutated or removed. Two backends implement [`AuditStore`]:
//! - [`MemoryAuditStore`] keeps the arena in memory only.
//! - [`JournalAuditStore`] additionally writes every entry to an
//!   append-only JSON-lines file, fsynced before the append returns.
//!
//! [`AuditSeq`]: regdesk_types::AuditSeq

pub mod arena;
pub mod error;
pub mod journal;
pub mod memory;

pub use arena::AuditArena;
pub use error::AuditError;
pub use journal::JournalAuditStore;
pub use memory::MemoryAuditStore;

use regdesk_types::{AuditLogEntry, EventId, NewAuditEntry};

/// Linearized append point for audit entries.
///
/// Implementations serialize appends internally; callers may share one store
/// across threads.
pub trait AuditStore: Send + Sync {
    /// Append an entry, returning it with its assigned sequence number.
    /// On error nothing has been recorded.
    fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, AuditError>;

    /// All entries for an event in append order.
    fn list(&self, event_id: &EventId) -> Result<Vec<AuditLogEntry>, AuditError>;

    /// Total number of entries across all events.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
