//! Raw document view produced after structural validation.
//!
//! Field values are kept as the text found in the document; interpreting
//! them (dates, numbers, references) is the business rule engine's job.

/// A `<sensor>` declaration in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDeclaration {
    pub id: String,
    pub kind: String,
}

/// A `<reading>` entry; `None` means the field element is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingEntry {
    pub timestamp: Option<String>,
    pub sensor_ref: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub place: String,
    pub sensors: Vec<SensorDeclaration>,
    pub readings: Vec<ReadingEntry>,
}
