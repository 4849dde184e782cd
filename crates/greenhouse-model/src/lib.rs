//! Data model for greenhouse telemetry documents.
//!
//! The types here are shared by the validator, the persistence layer and the
//! query layer:
//!
//! - [`Diagnostic`] and [`DiagnosticCode`] describe validation findings.
//! - [`Document`] is the raw, field-by-field view of a parsed document.
//! - [`Metadata`] is the normalized record handed to persistence.
//! - [`RangePolicy`] is the fixed per-kind bounds table.

#![deny(unsafe_code)]

pub mod diagnostic;
pub mod document;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod range;
pub mod timestamp;

pub use diagnostic::{
    Diagnostic, DiagnosticCode, ErrorKind, Location, RejectionClass, SelectedDiagnostic,
    select_reported,
};
pub use document::{Document, ReadingEntry, SensorDeclaration};
pub use error::{ModelError, Result};
pub use ids::DocumentId;
pub use metadata::{Metadata, Reading, ReadingStatus, StoredMetadata};
pub use range::{RANGE_TABLE, RangePolicy, range_for};
pub use timestamp::Timestamp;
