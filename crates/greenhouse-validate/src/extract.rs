//! Build the raw [`Document`] view from a schema-valid element tree.

use greenhouse_model::{Document, ReadingEntry, SensorDeclaration};

use crate::xml::XmlElement;

/// Extract document fields from the `<greenhouse>` root.
///
/// Identifiers and kinds are trimmed; timestamp and value text is kept as
/// found so the rule engine can report it verbatim.
pub fn document_from_tree(root: &XmlElement) -> Document {
    let sensors = root
        .child("sensors")
        .map(|sensors| {
            sensors
                .children_named("sensor")
                .map(|sensor| SensorDeclaration {
                    id: sensor.attribute("id").unwrap_or_default().trim().to_string(),
                    kind: child_text(sensor, "kind").unwrap_or_default().trim().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let readings = root
        .child("readings")
        .map(|readings| {
            readings
                .children_named("reading")
                .map(|reading| ReadingEntry {
                    timestamp: child_text(reading, "timestamp").map(str::to_string),
                    sensor_ref: reading
                        .child("sensorRef")
                        .map(|r| r.attribute("ref").unwrap_or_default().trim().to_string()),
                    value: child_text(reading, "value").map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    Document {
        name: child_text(root, "name").unwrap_or_default().to_string(),
        place: child_text(root, "place").unwrap_or_default().to_string(),
        sensors,
        readings,
    }
}

fn child_text<'a>(element: &'a XmlElement, name: &str) -> Option<&'a str> {
    element.child(name).map(|child| child.text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_tree;

    #[test]
    fn extracts_fields_and_absences() {
        let xml = br#"<greenhouse>
  <name>North</name><place>Plot 4</place>
  <sensors><sensor id=" t1 "><kind>temperature</kind></sensor></sensors>
  <readings>
    <reading><timestamp>2024-01-01T00:00:00Z</timestamp><sensorRef ref="t1"/><value> 21.5 </value></reading>
    <reading><value>3</value></reading>
  </readings>
</greenhouse>"#;
        let document = document_from_tree(&parse_tree(xml).unwrap());
        assert_eq!(document.name, "North");
        assert_eq!(document.place, "Plot 4");
        assert_eq!(
            document.sensors,
            vec![SensorDeclaration {
                id: "t1".to_string(),
                kind: "temperature".to_string()
            }]
        );
        assert_eq!(document.readings[0].sensor_ref.as_deref(), Some("t1"));
        assert_eq!(document.readings[0].value.as_deref(), Some(" 21.5 "));
        assert_eq!(
            document.readings[1],
            ReadingEntry {
                timestamp: None,
                sensor_ref: None,
                value: Some("3".to_string()),
            }
        );
    }
}
