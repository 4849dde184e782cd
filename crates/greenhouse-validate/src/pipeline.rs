//! Two-stage validation pipeline.
//!
//! raw bytes -> schema validation (short-circuits) -> business rules (full
//! pass) -> diagnostics plus metadata.

use greenhouse_model::{Diagnostic, Metadata, SelectedDiagnostic, select_reported};
use serde::Serialize;

use crate::extract::document_from_tree;
use crate::rules;
use crate::schema::SchemaValidator;

/// Result of running the pipeline on one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Present only when the business rule engine ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The single diagnostic a one-result caller should surface.
    pub fn reported(&self) -> Option<SelectedDiagnostic<'_>> {
        select_reported(&self.diagnostics)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'g> {
    schema: SchemaValidator<'g>,
}

impl Default for Pipeline<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline<'static> {
    pub fn new() -> Self {
        Self {
            schema: SchemaValidator::new(),
        }
    }
}

impl<'g> Pipeline<'g> {
    pub fn with_schema(schema: SchemaValidator<'g>) -> Self {
        Self { schema }
    }

    pub fn run(&self, bytes: &[u8]) -> ValidationReport {
        let span = tracing::debug_span!("validate", bytes = bytes.len());
        let _enter = span.enter();

        let root = match self.schema.parse(bytes) {
            Ok(root) => root,
            Err(diagnostics) => {
                return ValidationReport {
                    diagnostics,
                    metadata: None,
                };
            }
        };
        let document = document_from_tree(&root);
        let (diagnostics, metadata) = rules::check(&document);
        ValidationReport {
            diagnostics,
            metadata: Some(metadata),
        }
    }
}

/// Run the built-in pipeline.
pub fn validate_document(bytes: &[u8]) -> ValidationReport {
    Pipeline::new().run(bytes)
}
