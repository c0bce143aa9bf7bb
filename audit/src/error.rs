use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("audit journal is corrupted at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },
}
