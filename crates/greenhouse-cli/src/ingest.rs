//! Validate-then-store flow for one submitted document.

use greenhouse_model::{Diagnostic, DocumentId, RejectionClass};
use greenhouse_store::{DocumentStore, PersistenceError};
use greenhouse_validate::Pipeline;
use serde::Serialize;

/// Prefix of generated document ids.
pub const ID_PREFIX: &str = "reading";

/// What happened to a submitted document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Validated cleanly and stored under `id`.
    Accepted { id: DocumentId, readings: usize },
    /// At least one finding; `diagnostic` is the one selected for reporting.
    Rejected {
        class: RejectionClass,
        diagnostic: Diagnostic,
        total: usize,
    },
    /// Empty submission; nothing was validated.
    NoContent,
}

impl IngestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Process exit code for this outcome alone.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Accepted { .. } => 0,
            Self::Rejected {
                class: RejectionClass::Conflict,
                ..
            } => 3,
            Self::Rejected { .. } | Self::NoContent => 1,
        }
    }
}

/// Combined exit code for several outcomes: 0 if all were accepted, 3 if
/// every rejection was a conflict, 1 otherwise.
pub fn combined_exit_code<'a>(outcomes: impl IntoIterator<Item = &'a IngestOutcome>) -> i32 {
    outcomes
        .into_iter()
        .map(IngestOutcome::exit_code)
        .fold(0, |acc, code| match (acc, code) {
            (1, _) | (_, 1) => 1,
            (0, code) => code,
            (acc, _) => acc,
        })
}

/// Validate `bytes` with the built-in pipeline and store them when clean.
pub fn ingest(store: &dyn DocumentStore, bytes: &[u8]) -> Result<IngestOutcome, PersistenceError> {
    ingest_with(&Pipeline::new(), store, bytes)
}

pub fn ingest_with(
    pipeline: &Pipeline<'_>,
    store: &dyn DocumentStore,
    bytes: &[u8],
) -> Result<IngestOutcome, PersistenceError> {
    if bytes.is_empty() {
        tracing::warn!("rejected empty document");
        return Ok(IngestOutcome::NoContent);
    }

    let report = pipeline.run(bytes);
    if let Some(selected) = report.reported() {
        tracing::warn!(
            class = selected.class.label(),
            code = %selected.diagnostic.code,
            total = report.diagnostics.len(),
            "rejected document"
        );
        return Ok(IngestOutcome::Rejected {
            class: selected.class,
            diagnostic: selected.diagnostic.clone(),
            total: report.diagnostics.len(),
        });
    }

    let metadata = report.metadata.unwrap_or_default();
    let id = DocumentId::generate(ID_PREFIX);
    store.store(&id, bytes, &metadata)?;
    tracing::info!(id = %id, readings = metadata.readings.len(), "accepted document");
    Ok(IngestOutcome::Accepted {
        id,
        readings: metadata.readings.len(),
    })
}

#[cfg(test)]
mod tests {
    use greenhouse_model::DiagnosticCode;

    use super::*;

    fn rejected(class: RejectionClass) -> IngestOutcome {
        IngestOutcome::Rejected {
            class,
            diagnostic: Diagnostic::new(DiagnosticCode::InvalidRef, "x"),
            total: 1,
        }
    }

    #[test]
    fn exit_codes_combine() {
        let accepted = IngestOutcome::Accepted {
            id: DocumentId::new("reading_1").unwrap(),
            readings: 1,
        };
        let conflict = rejected(RejectionClass::Conflict);
        let invalid = rejected(RejectionClass::Invalid);

        assert_eq!(combined_exit_code([&accepted, &accepted]), 0);
        assert_eq!(combined_exit_code([&accepted, &conflict]), 3);
        assert_eq!(combined_exit_code([&conflict, &invalid]), 1);
        assert_eq!(combined_exit_code([&invalid, &conflict]), 1);
        assert_eq!(combined_exit_code([&IngestOutcome::NoContent]), 1);
        assert_eq!(combined_exit_code(std::iter::empty()), 0);
    }
}
