use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid document id '{0}': only ASCII letters, digits, '_' and '-' are allowed")]
    InvalidDocumentId(String),
    #[error("unknown reading status '{0}' (expected ok, out_of_range or unknown_range)")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
