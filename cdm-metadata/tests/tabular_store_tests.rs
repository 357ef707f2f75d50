//! Integration tests for the tab-separated export store
//!
//! **Test Coverage:**
//! - Header discovery and field presence
//! - Identifier lookup by number or string
//! - Eager field validation in `with_fields`
//! - Missing and malformed files

mod helpers;

use cdm_metadata::{MetadataError, RecordSource, TabularRecordStore};
use helpers::fixture_path;
use std::fs;
use tempfile::TempDir;

fn test_store() -> TabularRecordStore {
    TabularRecordStore::open(fixture_path("test.tsv")).expect("Failed to load test.tsv")
}

#[test]
fn test_fields_match_header_sorted() {
    let store = test_store();
    let fields = store.fields().unwrap();

    assert_eq!(fields.len(), 32);
    let mut sorted = fields.clone();
    sorted.sort();
    assert_eq!(fields, sorted);
    assert!(fields.contains(&"CONTENTdm number".to_string()));
    assert!(fields.contains(&"Map No. in Bassett Bibliography".to_string()));
}

#[test]
fn test_has_field() {
    let store = test_store();
    assert!(store.has_field("Title"));
    assert!(store.has_field("Creator"));
    assert!(!store.has_field("foo"));
}

#[test]
fn test_length() {
    let store = test_store();
    assert_eq!(store.len(), 26);
    assert_eq!(store.iter().count(), 26);
}

#[test]
fn test_get_record_by_number() {
    let store = test_store();
    let record = store.get_record(43).unwrap();
    assert_eq!(
        record.get("Title"),
        Some("Map with tributaries to Congo River, Mpozo River")
    );
    assert_eq!(record.get("Creator"), Some("Brinkman, C.L."));
    assert_eq!(record.id(), Some("43"));
}

#[test]
fn test_get_record_by_string() {
    let store = test_store();
    assert_eq!(store.get_record("43").unwrap(), store.get_record(43).unwrap());
}

#[test]
fn test_identifier_round_trip() {
    let store = test_store();
    for id in 30..=55 {
        let record = store.get_record(id).unwrap();
        assert_eq!(record.id(), Some(id.to_string().as_str()));
    }
    assert!(matches!(
        store.get_record(56),
        Err(MetadataError::RecordNotFound(id)) if id == "56"
    ));
}

#[test]
fn test_contains() {
    let store = test_store();
    assert!(store.contains(30));
    assert!(!store.contains(29));
}

#[test]
fn test_with_fields() {
    let store = test_store();
    let rows: Vec<_> = store.with_fields(&["Title", "Creator"]).unwrap().collect();

    assert_eq!(rows.len(), 26);
    for row in &rows {
        let names: Vec<_> = row.fields().collect();
        assert_eq!(names, vec!["Creator", "Title"]);
    }
}

#[test]
fn test_with_fields_unknown_field() {
    let store = test_store();
    assert!(matches!(
        store.with_fields(&["Title", "foo"]),
        Err(MetadataError::FieldNotFound(name)) if name == "foo"
    ));
}

#[test]
fn test_iteration_is_restartable() {
    let store = test_store();
    let first: Vec<_> = store.iter().map(|r| r.id().map(str::to_string)).collect();
    let second: Vec<_> = store.iter().map(|r| r.id().map(str::to_string)).collect();
    assert_eq!(first, second);
    assert_eq!(first[0].as_deref(), Some("30"));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        TabularRecordStore::open("bad_file.tsv"),
        Err(MetadataError::InputNotFound(_))
    ));
}

#[test]
fn test_ragged_row_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ragged.tsv");
    fs::write(&path, "CONTENTdm number\tTitle\n1\tRead\n2\n").unwrap();

    assert!(matches!(
        TabularRecordStore::open(&path),
        Err(MetadataError::Tabular(_))
    ));
}

#[test]
fn test_header_only_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.tsv");
    fs::write(&path, "CONTENTdm number\tTitle\n").unwrap();

    let store = TabularRecordStore::open(&path).unwrap();
    assert!(store.is_empty());
    assert!(matches!(store.fields(), Err(MetadataError::NoRecords)));
}

fn load_len<S: RecordSource>(name: &str) -> usize {
    S::load_data(&fixture_path(name)).unwrap().len()
}

#[test]
fn test_stores_load_through_shared_capability() {
    assert_eq!(load_len::<TabularRecordStore>("test.tsv"), 26);
    assert_eq!(load_len::<TabularRecordStore>("export.tsv"), 7);
    assert_eq!(load_len::<cdm_metadata::MarkupRecordStore>("export.xml"), 5);
}
