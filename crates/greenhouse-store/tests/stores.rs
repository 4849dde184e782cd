use std::collections::BTreeMap;
use std::fs;

use greenhouse_model::{DocumentId, Location, Metadata, Reading, ReadingStatus};
use greenhouse_store::{DocumentStore, FileStore, MemoryStore, PersistenceError, sha256_hex};
use tempfile::tempdir;

const RAW: &[u8] = b"<greenhouse><name>North</name></greenhouse>";

fn id(value: &str) -> DocumentId {
    DocumentId::new(value).expect("valid id")
}

fn metadata(name: &str) -> Metadata {
    Metadata {
        name: name.to_string(),
        place: "Plot 4".to_string(),
        sensors: BTreeMap::from([("t1".to_string(), "temperature".to_string())]),
        readings: vec![Reading {
            timestamp: Some("2024-01-01T00:00:00+00:00".to_string()),
            sensor_ref: Some("t1".to_string()),
            value: Some(25.0),
            status: ReadingStatus::Ok,
            location: Location::path("/greenhouse/readings/reading[1]"),
        }],
    }
}

fn round_trip(store: &dyn DocumentStore) {
    let first = id("reading_b");
    let second = id("reading_a");

    let record = store.store(&first, RAW, &metadata("North")).expect("store");
    assert_eq!(record.id, first);
    assert_eq!(record.raw_sha256, sha256_hex(RAW));
    store
        .store(&second, b"<greenhouse/>", &metadata("South"))
        .expect("store");

    assert_eq!(store.load_raw(&first).expect("load").as_deref(), Some(RAW));
    let loaded = store.load_metadata(&first).expect("load").expect("present");
    assert_eq!(loaded, record);
    assert_eq!(loaded.metadata, metadata("North"));

    let listed = store.list_all_metadata().expect("list");
    let names: Vec<&str> = listed.iter().map(|r| r.metadata.name.as_str()).collect();
    assert_eq!(names, ["South", "North"]);

    let unknown = id("reading_zzz");
    assert!(store.load_raw(&unknown).expect("load").is_none());
    assert!(store.load_metadata(&unknown).expect("load").is_none());

    let duplicate = store.store(&first, RAW, &metadata("Again"));
    assert!(matches!(duplicate, Err(PersistenceError::AlreadyExists { .. })));
}

#[test]
fn memory_store_round_trip() {
    round_trip(&MemoryStore::new());
}

#[test]
fn file_store_round_trip() {
    let dir = tempdir().expect("tempdir");
    round_trip(&FileStore::open(dir.path()).expect("open"));
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let doc = id("reading_20240101T000000Z_abc123");
    FileStore::open(dir.path())
        .expect("open")
        .store(&doc, RAW, &metadata("North"))
        .expect("store");

    let reopened = FileStore::open(dir.path()).expect("reopen");
    let listed = reopened.list_all_metadata().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, doc);
    assert_eq!(reopened.load_raw(&doc).expect("load").as_deref(), Some(RAW));
}

#[test]
fn file_store_writes_envelope_json() {
    let dir = tempdir().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("open");
    let doc = id("reading_1");
    store.store(&doc, RAW, &metadata("North")).expect("store");

    let json: serde_json::Value =
        serde_json::from_slice(&fs::read(store.metadata_path(&doc)).expect("read"))
            .expect("json");
    assert_eq!(json["id"], "reading_1");
    assert_eq!(json["rawSha256"], sha256_hex(RAW));
    assert_eq!(json["name"], "North");
    assert_eq!(json["sensors"]["t1"], "temperature");
    assert_eq!(json["readings"][0]["sensorRef"], "t1");
    assert!(json["storedAt"].is_string());
    assert_eq!(fs::read(store.raw_path(&doc)).expect("read"), RAW);
}

#[test]
fn modified_raw_file_fails_integrity_check() {
    let dir = tempdir().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("open");
    let doc = id("reading_1");
    store.store(&doc, RAW, &metadata("North")).expect("store");

    fs::write(store.raw_path(&doc), b"<greenhouse>tampered</greenhouse>").expect("write");

    match store.load_raw(&doc) {
        Err(PersistenceError::IntegrityMismatch {
            expected_hash,
            actual_hash,
            ..
        }) => {
            assert_eq!(expected_hash, sha256_hex(RAW));
            assert_ne!(actual_hash, expected_hash);
        }
        other => panic!("expected integrity mismatch, got {other:?}"),
    }
}

#[test]
fn corrupt_metadata_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("open");
    fs::write(dir.path().join("reading_1.meta.json"), b"{not json").expect("write");

    let err = store.list_all_metadata().expect_err("corrupt record");
    assert!(matches!(err, PersistenceError::Deserialization { .. }));
    assert!(err.suggestion().is_some());
}

#[test]
fn metadata_for_another_id_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("open");
    let doc = id("reading_1");
    store.store(&doc, RAW, &metadata("North")).expect("store");
    fs::copy(
        store.metadata_path(&doc),
        dir.path().join("reading_2.meta.json"),
    )
    .expect("copy");

    assert!(matches!(
        store.load_metadata(&id("reading_2")),
        Err(PersistenceError::InvalidRecord { .. })
    ));
}

#[test]
fn unrelated_files_are_ignored_by_listing() {
    let dir = tempdir().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("open");
    fs::write(dir.path().join("notes.txt"), b"hello").expect("write");
    fs::write(dir.path().join("bad name.meta.json"), b"{}").expect("write");

    assert!(store.list_all_metadata().expect("list").is_empty());
}
