//! Error types for the progress ledger.

use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Objective not found: {0}")]
    ObjectiveNotFound(String),

    #[error("Data point not found: {0}")]
    DataPointNotFound(String),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid import: {0}")]
    InvalidImport(String),

    #[error("Invalid slot key: {0}")]
    InvalidSlotKey(String),

    #[error("Ledger is locked by another process")]
    Locked,
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            LedgerError::Deserialization(e.to_string())
        } else {
            LedgerError::Serialization(e.to_string())
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
