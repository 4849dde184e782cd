//! Persistence error types.
//!
//! Every store operation returns a structured error with a user-facing
//! message and an optional remediation hint.

use std::path::PathBuf;

use greenhouse_model::DocumentId;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document with this id is already stored.
    #[error("Document already exists: {id}")]
    AlreadyExists { id: DocumentId },

    /// A metadata file does not describe the document it is named after.
    #[error("Invalid metadata record: {path}")]
    InvalidRecord { path: PathBuf, reason: String },

    /// Raw bytes no longer match the hash recorded when they were stored.
    #[error("Stored document has been modified: {id}")]
    IntegrityMismatch {
        id: DocumentId,
        expected_hash: String,
        actual_hash: String,
    },

    /// Serialization error.
    #[error("Failed to serialize metadata")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization error.
    #[error("Failed to deserialize metadata: {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete write operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A writer panicked while holding the in-memory store lock.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::AlreadyExists { id } => {
                format!("A document with id '{id}' is already stored.")
            }
            Self::InvalidRecord { path, reason } => {
                format!(
                    "The metadata file at {} is not a valid record: {}",
                    path.display(),
                    reason
                )
            }
            Self::IntegrityMismatch { id, .. } => {
                format!("The stored document '{id}' has been modified since it was accepted.")
            }
            Self::Serialization { .. } => {
                "An error occurred while saving the document metadata.".to_string()
            }
            Self::Deserialization { path, .. } => {
                format!(
                    "The metadata file at {} could not be read. It may be corrupted.",
                    path.display()
                )
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::LockPoisoned => "The document store is no longer usable.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to the data directory.".into())
                }
            }
            Self::AlreadyExists { .. } => Some("Submit the document again to get a new id.".into()),
            Self::InvalidRecord { .. } | Self::Deserialization { .. } => {
                Some("Remove the damaged record or restore it from a backup.".into())
            }
            Self::IntegrityMismatch { .. } => {
                Some("Restore the original file or ingest the document again.".into())
            }
            Self::Serialization { .. } => None,
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or choose a different data directory.".into())
            }
            Self::LockPoisoned => Some("Restart the process.".into()),
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
