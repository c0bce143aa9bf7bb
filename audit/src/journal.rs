//! File-backed audit store.
//!
//! The journal is a newline-delimited JSON file, one [`AuditLogEntry`] per
//! line, written append-only and fsynced before `append` returns. On open
//! the file is replayed into the arena. A torn final line (crash mid-write)
//! is dropped and truncated away; damage anywhere else is reported as
//! [`AuditError::Corrupt`].

use crate::{AuditArena, AuditError, AuditStore};
use regdesk_types::{AuditLogEntry, EventId, NewAuditEntry};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

struct Journal {
    arena: AuditArena,
    file: File,
    /// Length of the journal up to the end of the last complete entry.
    committed_len: u64,
}

pub struct JournalAuditStore {
    path: PathBuf,
    inner: Mutex<Journal>,
}

impl JournalAuditStore {
    /// Open (or create) the journal at `path` and replay it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let (arena, committed_len, torn) = replay(&mut file)?;
        if torn {
            warn!(
                path = %path.display(),
                committed_len,
                "dropping torn trailing entry from audit journal"
            );
            file.set_len(committed_len)?;
            file.sync_data()?;
        }
        info!(
            path = %path.display(),
            entries = arena.len(),
            "audit journal opened"
        );

        Ok(Self {
            path,
            inner: Mutex::new(Journal {
                arena,
                file,
                committed_len,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Rebuild the arena from the file. Returns the arena, the byte length of
/// the valid prefix, and whether a torn trailing line was found.
fn replay(file: &mut File) -> Result<(AuditArena, u64, bool), AuditError> {
    file.seek(SeekFrom::Start(0))?;
    let mut reader = BufReader::new(&*file);
    let mut arena = AuditArena::new();
    let mut committed_len = 0u64;
    let mut line_no = 0usize;
    let mut buf = String::new();

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            return Ok((arena, committed_len, false));
        }
        line_no += 1;

        let parsed = if buf.ends_with('\n') {
            serde_json::from_str::<AuditLogEntry>(buf.trim_end()).map_err(|e| e.to_string())
        } else {
            Err("unterminated entry".to_string())
        };
        match parsed {
            Ok(entry) => {
                arena.push(entry).map_err(|expected| AuditError::Corrupt {
                    line: line_no,
                    reason: format!("expected seq {expected}"),
                })?;
                committed_len += read as u64;
            }
            // A bad line is only tolerated at the very end of the file.
            Err(reason) => {
                let mut rest = String::new();
                reader.read_line(&mut rest)?;
                if rest.is_empty() {
                    return Ok((arena, committed_len, true));
                }
                return Err(AuditError::Corrupt {
                    line: line_no,
                    reason,
                });
            }
        }
    }
}

impl AuditStore for JournalAuditStore {
    fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, AuditError> {
        let mut guard = self.journal();
        let journal = &mut *guard;
        let stamped = journal.arena.stamp(entry);
        let mut line = serde_json::to_vec(&stamped)?;
        line.push(b'\n');

        let written = journal
            .file
            .write_all(&line)
            .and_then(|()| journal.file.sync_data());
        if let Err(e) = written {
            // Cut any partial write so the next append starts on a clean line.
            if let Err(trunc) = journal.file.set_len(journal.committed_len) {
                warn!(error = %trunc, "failed to roll back partial audit write");
            }
            return Err(AuditError::Io(e));
        }

        journal.committed_len += line.len() as u64;
        journal
            .arena
            .push(stamped.clone())
            .map_err(|expected| AuditError::Corrupt {
                line: expected.get() as usize,
                reason: "sequence gap after journal write".into(),
            })?;
        tracing::debug!(
            seq = %stamped.seq,
            event = %stamped.event_id,
            action = stamped.action.name(),
            "audit entry journaled"
        );
        Ok(stamped)
    }

    fn list(&self, event_id: &EventId) -> Result<Vec<AuditLogEntry>, AuditError> {
        Ok(self.journal().arena.list(event_id))
    }

    fn len(&self) -> usize {
        self.journal().arena.len()
    }
}
