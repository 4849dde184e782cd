//! Document builders shared by the integration tests.

#![allow(dead_code)]

pub fn sensor(id: &str, kind: &str) -> String {
    format!(r#"<sensor id="{id}"><kind>{kind}</kind></sensor>"#)
}

pub fn reading(timestamp: Option<&str>, sensor_ref: Option<&str>, value: Option<&str>) -> String {
    let mut xml = String::from("<reading>");
    if let Some(timestamp) = timestamp {
        xml.push_str(&format!("<timestamp>{timestamp}</timestamp>"));
    }
    if let Some(sensor_ref) = sensor_ref {
        xml.push_str(&format!(r#"<sensorRef ref="{sensor_ref}"/>"#));
    }
    if let Some(value) = value {
        xml.push_str(&format!("<value>{value}</value>"));
    }
    xml.push_str("</reading>");
    xml
}

pub fn full_reading(timestamp: &str, sensor_ref: &str, value: &str) -> String {
    reading(Some(timestamp), Some(sensor_ref), Some(value))
}

pub fn document(sensors: &[String], readings: &[String]) -> Vec<u8> {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<greenhouse>\n  <name>North House</name>\n  <place>Plot 4</place>\n  <sensors>{}</sensors>\n  <readings>{}</readings>\n</greenhouse>\n",
        sensors.concat(),
        readings.concat()
    )
    .into_bytes()
}
