use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use greenhouse_model::{DocumentId, Location, Metadata, Reading, ReadingStatus, StoredMetadata};
use greenhouse_query::{Pagination, QueryFilter, query};

fn reading(index: usize, timestamp: Option<&str>, sensor: &str, value: f64, status: ReadingStatus) -> Reading {
    Reading {
        timestamp: timestamp.map(str::to_string),
        sensor_ref: Some(sensor.to_string()),
        value: Some(value),
        status,
        location: Location::path(format!("/greenhouse/readings/reading[{index}]")),
    }
}

fn record(id: &str, name: &str, readings: Vec<Reading>) -> StoredMetadata {
    StoredMetadata {
        id: DocumentId::new(id).expect("id"),
        stored_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        raw_sha256: "00".repeat(32),
        metadata: Metadata {
            name: name.to_string(),
            place: "Plot 4".to_string(),
            sensors: BTreeMap::from([
                ("t1".to_string(), "temperature".to_string()),
                ("c1".to_string(), "co2".to_string()),
            ]),
            readings,
        },
    }
}

fn fixture() -> Vec<StoredMetadata> {
    vec![
        record(
            "reading_a",
            "North",
            vec![
                reading(1, Some("2024-01-01T00:00:00+00:00"), "t1", 20.0, ReadingStatus::Ok),
                reading(2, Some("2024-01-01T06:00:00+00:00"), "t1", 80.0, ReadingStatus::OutOfRange),
                reading(3, None, "t1", 21.0, ReadingStatus::Ok),
                reading(4, Some("2024-01-01T06:00:00+00:00"), "c1", 400.0, ReadingStatus::Ok),
            ],
        ),
        record(
            "reading_b",
            "South",
            vec![
                reading(1, Some("2024-01-02T00:00:00+00:00"), "t1", 22.0, ReadingStatus::Ok),
                reading(2, Some("2024-01-02T00:00:00+00:00"), "x9", 5.0, ReadingStatus::Ok),
            ],
        ),
    ]
}

#[test]
fn unfiltered_query_skips_readings_without_timestamp() {
    let page = query(&fixture(), &QueryFilter::new(), Pagination::default());
    assert_eq!(page.total, 5);
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 20);
    let values: Vec<f64> = page.items.iter().filter_map(|row| row.value).collect();
    assert_eq!(values, [20.0, 80.0, 400.0, 22.0, 5.0]);
}

#[test]
fn rows_carry_document_context() {
    let page = query(&fixture(), &QueryFilter::new(), Pagination::default());
    let last = page.items.last().expect("row");
    assert_eq!(last.source_id.as_str(), "reading_b");
    assert_eq!(last.name, "South");
    assert_eq!(last.place, "Plot 4");
    assert_eq!(last.sensor_ref.as_deref(), Some("x9"));
    assert_eq!(last.kind, None);
    assert_eq!(last.location.as_str(), "/greenhouse/readings/reading[2]");
}

#[test]
fn filters_combine_with_and() {
    let filter = QueryFilter::new()
        .with_kind("temperature")
        .with_status(ReadingStatus::Ok);
    let page = query(&fixture(), &filter, Pagination::default());
    let values: Vec<f64> = page.items.iter().filter_map(|row| row.value).collect();
    assert_eq!(values, [20.0, 22.0]);
}

#[test]
fn date_range_is_inclusive() {
    let filter = QueryFilter::new()
        .with_start("2024-01-01T06:00:00Z")
        .expect("start")
        .with_end("2024-01-02")
        .expect("end");
    let page = query(&fixture(), &filter, Pagination::default());
    assert_eq!(page.total, 4);
    assert!(page.items.iter().all(|row| row.timestamp != "2024-01-01T00:00:00+00:00"));
}

#[test]
fn pagination_slices_after_counting() {
    let records = fixture();
    let filter = QueryFilter::new();

    let second = query(&records, &filter, Pagination::new(2, 2).expect("page"));
    assert_eq!(second.total, 5);
    let values: Vec<f64> = second.items.iter().filter_map(|row| row.value).collect();
    assert_eq!(values, [400.0, 22.0]);

    let beyond = query(&records, &filter, Pagination::new(4, 2).expect("page"));
    assert_eq!(beyond.total, 5);
    assert!(beyond.items.is_empty());
}

#[test]
fn page_serializes_camel_case_rows() {
    let filter = QueryFilter::new().with_kind("co2");
    let page = query(&fixture(), &filter, Pagination::default());
    let json = serde_json::to_value(&page).expect("json");
    assert_eq!(json["total"], 1);
    assert_eq!(json["per_page"], 20);
    let row = &json["items"][0];
    assert_eq!(row["sourceId"], "reading_a");
    assert_eq!(row["sensorRef"], "c1");
    assert_eq!(row["kind"], "co2");
    assert_eq!(row["status"], "ok");
    assert_eq!(row["value"], 400.0);
}

#[test]
fn empty_store_yields_empty_page() {
    let page = query(&[], &QueryFilter::new(), Pagination::default());
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}
