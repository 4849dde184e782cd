//! Business rule engine.
//!
//! Runs over a schema-valid [`Document`] in three passes (sensors, readings,
//! duplicate readings) and never stops early: every finding is appended to
//! the diagnostic list in traversal order.

use std::collections::{BTreeMap, HashSet};

use greenhouse_model::{
    Diagnostic, DiagnosticCode, Document, Location, Metadata, Reading, ReadingEntry,
    ReadingStatus, Timestamp, range_for,
};

const SENSOR_PATH: &str = "/greenhouse/sensors/sensor";
const READING_PATH: &str = "/greenhouse/readings/reading";

/// Positional locator of the `index`-th sensor (1-based).
pub fn sensor_location(index: usize) -> Location {
    Location::path(format!("{SENSOR_PATH}[{index}]"))
}

/// Positional locator of the `index`-th reading (1-based).
pub fn reading_location(index: usize) -> Location {
    Location::path(format!("{READING_PATH}[{index}]"))
}

/// Check business rules and build the normalized metadata record.
pub fn check(document: &Document) -> (Vec<Diagnostic>, Metadata) {
    let mut diagnostics = Vec::new();
    let sensors = sensor_pass(document, &mut diagnostics);
    let readings = document
        .readings
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            evaluate_reading(entry, reading_location(idx + 1), &sensors, &mut diagnostics)
        })
        .collect::<Vec<_>>();
    duplicate_pass(&readings, &mut diagnostics);

    tracing::debug!(
        sensors = sensors.len(),
        readings = readings.len(),
        diagnostics = diagnostics.len(),
        "business rules checked"
    );

    let metadata = Metadata {
        name: document.name.clone(),
        place: document.place.clone(),
        sensors,
        readings,
    };
    (diagnostics, metadata)
}

/// Build `id -> kind`; a repeated id is reported and the last kind wins.
fn sensor_pass(
    document: &Document,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<String, String> {
    let mut sensors = BTreeMap::new();
    for (idx, sensor) in document.sensors.iter().enumerate() {
        let previous = sensors.insert(sensor.id.clone(), sensor.kind.clone());
        if previous.is_some() {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateSensorId,
                    format!("sensor id '{}' is declared more than once", sensor.id),
                )
                .at(sensor_location(idx + 1)),
            );
        }
    }
    sensors
}

fn evaluate_reading(
    entry: &ReadingEntry,
    location: Location,
    sensors: &BTreeMap<String, String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Reading {
    let timestamp = match entry.timestamp.as_deref() {
        None => {
            diagnostics.push(missing_field(&location, "timestamp"));
            None
        }
        Some(text) => match Timestamp::parse(text) {
            Some(timestamp) => Some(timestamp.to_iso_string()),
            None => {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::InvalidDatetime,
                        format!("timestamp '{}' is not a valid date-time", text.trim()),
                    )
                    .at(location.child("timestamp")),
                );
                None
            }
        },
    };

    let kind = match entry.sensor_ref.as_deref() {
        None => {
            diagnostics.push(missing_field(&location, "sensorRef"));
            None
        }
        Some(reference) => {
            let kind = sensors.get(reference);
            if kind.is_none() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::InvalidRef,
                        format!("sensorRef '{reference}' does not match any declared sensor id"),
                    )
                    .at(location.child("sensorRef")),
                );
            }
            kind
        }
    };

    let value = match entry.value.as_deref() {
        None => {
            diagnostics.push(missing_field(&location, "value"));
            None
        }
        Some(text) => {
            let parsed = parse_number(text);
            if parsed.is_none() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::InvalidNumber,
                        format!("value '{}' is not numeric", text.trim()),
                    )
                    .at(location.child("value")),
                );
            }
            parsed
        }
    };

    let status = match (kind, value) {
        (Some(kind), Some(value)) => classify(kind, value, &location, diagnostics),
        // nothing to classify against
        _ => ReadingStatus::Ok,
    };
    tracing::trace!(location = %location, ?value, %status, "reading evaluated");

    Reading {
        timestamp,
        sensor_ref: entry.sensor_ref.clone(),
        value,
        status,
        location,
    }
}

fn classify(
    kind: &str,
    value: f64,
    location: &Location,
    diagnostics: &mut Vec<Diagnostic>,
) -> ReadingStatus {
    let Some(policy) = range_for(kind) else {
        return ReadingStatus::UnknownRange;
    };
    if policy.contains(value) {
        return ReadingStatus::Ok;
    }
    diagnostics.push(
        Diagnostic::new(
            DiagnosticCode::OutOfRange,
            format!(
                "value {value} is outside [{}..{}] for kind '{kind}'",
                policy.lo, policy.hi
            ),
        )
        .at(location.child("value")),
    );
    ReadingStatus::OutOfRange
}

/// Report every repeat of a `(sensorRef, timestamp)` key after its first
/// occurrence. Unset fields take part in the key as absent values.
fn duplicate_pass(readings: &[Reading], diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashSet<(Option<&str>, Option<&str>)> = HashSet::new();
    for reading in readings {
        let key = (reading.sensor_ref.as_deref(), reading.timestamp.as_deref());
        if !seen.insert(key) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateReading,
                    format!(
                        "duplicate reading for sensor '{}' at {}",
                        key.0.unwrap_or("-"),
                        key.1.unwrap_or("-")
                    ),
                )
                .at(reading.location.clone()),
            );
        }
    }
}

fn missing_field(location: &Location, field: &str) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::MissingField,
        format!("reading has no {field}"),
    )
    .at(location.child(field))
}

/// Finite `f64` from trimmed text.
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_accepts_common_forms() {
        assert_eq!(parse_number(" 25 "), Some(25.0));
        assert_eq!(parse_number("-10.5"), Some(-10.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn locations_are_one_based() {
        assert_eq!(
            reading_location(1).child("value").as_str(),
            "/greenhouse/readings/reading[1]/value"
        );
        assert_eq!(sensor_location(2).as_str(), "/greenhouse/sensors/sensor[2]");
    }
}
