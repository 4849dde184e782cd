//! Queries over stored greenhouse readings.
//!
//! Stored documents are flattened into one row per reading, paired with the
//! document's id, name and place. Rows are filtered by sensor kind, status
//! and an inclusive date range, then paginated.

mod error;
mod filter;
mod query;

pub use error::{QueryError, Result};
pub use filter::{DEFAULT_PAGE, DEFAULT_PER_PAGE, Pagination, QueryFilter};
pub use query::{QueryPage, QueryRow, query};
