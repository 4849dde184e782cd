//! Validation diagnostics.
//!
//! Both validation stages report findings as an ordered `Vec<Diagnostic>`.
//! Order is traversal order and duplicates at different locations are kept
//! as distinct entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// Input is not well-formed markup.
    SyntaxError,
    /// Well-formed input that does not conform to the grammar.
    SchemaError,
    /// A reading lacks a timestamp, sensor reference or value.
    MissingField,
    /// Timestamp text is not a recognizable date-time.
    InvalidDatetime,
    /// Sensor reference does not name a declared sensor.
    InvalidRef,
    /// Value text is not a finite number.
    InvalidNumber,
    /// Value lies outside the bounds for the sensor kind.
    OutOfRange,
    /// The same sensor id is declared more than once.
    DuplicateSensorId,
    /// Two readings share a sensor reference and timestamp.
    DuplicateReading,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SyntaxError => "SYNTAX_ERROR",
            Self::SchemaError => "SCHEMA_ERROR",
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidDatetime => "INVALID_DATETIME",
            Self::InvalidRef => "INVALID_REF",
            Self::InvalidNumber => "INVALID_NUMBER",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::DuplicateSensorId => "DUPLICATE_SENSOR_ID",
            Self::DuplicateReading => "DUPLICATE_READING",
        }
    }

    /// Uniqueness conflicts are surfaced ahead of every other finding.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateSensorId | Self::DuplicateReading)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SyntaxError => ErrorKind::Syntax,
            Self::SchemaError => ErrorKind::Schema,
            _ => ErrorKind::BusinessRule,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy a diagnostic code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input; the pipeline stops before any other check.
    Syntax,
    /// Grammar non-conformance; the pipeline stops before business rules.
    Schema,
    /// Semantic issue; the rule pass keeps going.
    BusinessRule,
}

/// Positional locator of a finding.
///
/// Business rules use document paths such as
/// `/greenhouse/readings/reading[2]/value`; schema findings use `line:N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn path(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn line(line: usize) -> Self {
        Self(format!("line:{line}"))
    }

    /// Extend a path location with a child step.
    pub fn child(&self, step: &str) -> Self {
        Self(format!("{}/{step}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {}: {}", self.code, location, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// Outcome class used when a caller can only surface one diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionClass {
    /// A uniqueness conflict (duplicate sensor id or duplicate reading).
    Conflict,
    /// Any other validation failure.
    Invalid,
}

impl RejectionClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::Invalid => "invalid",
        }
    }
}

/// The diagnostic a single-result caller reports, with its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedDiagnostic<'a> {
    pub class: RejectionClass,
    pub diagnostic: &'a Diagnostic,
}

/// Pick the one diagnostic to surface from an ordered list.
///
/// The first conflict-class diagnostic wins over everything else; without a
/// conflict the first diagnostic in traversal order is reported as invalid.
pub fn select_reported(diagnostics: &[Diagnostic]) -> Option<SelectedDiagnostic<'_>> {
    if let Some(diagnostic) = diagnostics.iter().find(|d| d.code.is_conflict()) {
        return Some(SelectedDiagnostic {
            class: RejectionClass::Conflict,
            diagnostic,
        });
    }
    diagnostics.first().map(|diagnostic| SelectedDiagnostic {
        class: RejectionClass::Invalid,
        diagnostic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(code: DiagnosticCode, path: &str) -> Diagnostic {
        Diagnostic::new(code, "test").at(Location::path(path))
    }

    #[test]
    fn select_prefers_first_conflict() {
        let diagnostics = vec![
            diag(DiagnosticCode::MissingField, "/a"),
            diag(DiagnosticCode::OutOfRange, "/b"),
            diag(DiagnosticCode::DuplicateReading, "/c"),
            diag(DiagnosticCode::DuplicateReading, "/d"),
        ];
        let selected = select_reported(&diagnostics).expect("selection");
        assert_eq!(selected.class, RejectionClass::Conflict);
        assert_eq!(selected.diagnostic.location, Some(Location::path("/c")));
    }

    #[test]
    fn select_falls_back_to_first() {
        let diagnostics = vec![
            diag(DiagnosticCode::InvalidRef, "/a"),
            diag(DiagnosticCode::OutOfRange, "/b"),
        ];
        let selected = select_reported(&diagnostics).expect("selection");
        assert_eq!(selected.class, RejectionClass::Invalid);
        assert_eq!(selected.diagnostic.code, DiagnosticCode::InvalidRef);
    }

    #[test]
    fn select_empty_is_none() {
        assert!(select_reported(&[]).is_none());
    }

    #[test]
    fn code_serializes_screaming_snake() {
        let json = serde_json::to_string(&DiagnosticCode::DuplicateSensorId).unwrap();
        assert_eq!(json, "\"DUPLICATE_SENSOR_ID\"");
    }

    #[test]
    fn absent_location_is_omitted() {
        let json = serde_json::to_value(Diagnostic::new(DiagnosticCode::SyntaxError, "bad"))
            .unwrap();
        assert!(json.get("location").is_none());
        assert_eq!(json["code"], "SYNTAX_ERROR");
    }

    #[test]
    fn display_includes_location() {
        let d = diag(DiagnosticCode::InvalidNumber, "/greenhouse/readings/reading[1]/value");
        assert_eq!(
            d.to_string(),
            "INVALID_NUMBER at /greenhouse/readings/reading[1]/value: test"
        );
    }
}
