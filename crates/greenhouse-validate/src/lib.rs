//! Validation for greenhouse telemetry documents.
//!
//! Validation runs in two stages:
//!
//! 1. [`SchemaValidator`] parses the raw bytes and checks them against the
//!    compiled [`Grammar`]. Any finding here stops the pipeline.
//! 2. [`rules::check`] walks the document, accumulating every business rule
//!    violation, and produces the normalized [`greenhouse_model::Metadata`].
//!
//! [`Pipeline`] chains both stages.
//!
//! # Example
//!
//! ```
//! use greenhouse_validate::validate_document;
//!
//! let report = validate_document(br#"<greenhouse>
//!   <name>North</name><place>Plot 4</place>
//!   <sensors><sensor id="t1"><kind>temperature</kind></sensor></sensors>
//!   <readings>
//!     <reading>
//!       <timestamp>2024-01-01T00:00:00Z</timestamp>
//!       <sensorRef ref="t1"/>
//!       <value>25</value>
//!     </reading>
//!   </readings>
//! </greenhouse>"#);
//! assert!(report.is_valid());
//! ```

pub mod extract;
pub mod grammar;
pub mod pipeline;
pub mod rules;
pub mod schema;
pub mod xml;

pub use grammar::{GREENHOUSE_GRAMMAR, Grammar, GrammarError, default_grammar};
pub use pipeline::{Pipeline, ValidationReport, validate_document};
pub use schema::SchemaValidator;
pub use xml::{XmlElement, XmlSyntaxError};
