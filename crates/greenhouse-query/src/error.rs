use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("{bound} bound '{value}' is not a valid date-time")]
    InvalidBound { bound: &'static str, value: String },
    #[error("page must be at least 1")]
    ZeroPage,
    #[error("per_page must be at least 1")]
    ZeroPerPage,
}

pub type Result<T> = std::result::Result<T, QueryError>;
