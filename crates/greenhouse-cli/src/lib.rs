//! Library components of the `greenhouse` command-line tool.

pub mod ingest;
pub mod logging;
pub mod summary;

pub use ingest::{ID_PREFIX, IngestOutcome, combined_exit_code, ingest, ingest_with};
