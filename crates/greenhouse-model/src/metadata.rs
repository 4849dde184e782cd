//! Normalized metadata record handed to persistence and queried later.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diagnostic::Location;
use crate::error::ModelError;
use crate::ids::DocumentId;

/// Range classification of a reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    /// Within bounds, or not classified because the reference or value
    /// could not be resolved.
    #[default]
    Ok,
    /// Outside the inclusive bounds of the sensor kind.
    OutOfRange,
    /// The sensor kind has no range policy.
    UnknownRange,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::OutOfRange => "out_of_range",
            Self::UnknownRange => "unknown_range",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ok" => Ok(Self::Ok),
            "out_of_range" => Ok(Self::OutOfRange),
            "unknown_range" => Ok(Self::UnknownRange),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

/// A reading after business-rule evaluation.
///
/// `timestamp` is the normalized rendering (see [`crate::Timestamp`]) and is
/// `None` when the field was missing or unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub timestamp: Option<String>,
    pub sensor_ref: Option<String>,
    pub value: Option<f64>,
    pub status: ReadingStatus,
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub place: String,
    /// Sensor id to kind.
    pub sensors: BTreeMap<String, String>,
    pub readings: Vec<Reading>,
}

impl Metadata {
    /// Kind of the sensor a reading refers to, if it resolves.
    pub fn kind_of(&self, reading: &Reading) -> Option<&str> {
        reading
            .sensor_ref
            .as_deref()
            .and_then(|id| self.sensors.get(id))
            .map(String::as_str)
    }

    pub fn count_status(&self, status: ReadingStatus) -> usize {
        self.readings.iter().filter(|r| r.status == status).count()
    }
}

/// Metadata as listed back from a store, with its storage context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMetadata {
    pub id: DocumentId,
    pub stored_at: DateTime<Utc>,
    pub raw_sha256: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}
