//! Integration tests for the XML export store
//!
//! **Test Coverage:**
//! - Item and page extraction from a real poster collection export
//! - Multi-valued fields and whitespace cleanup
//! - Field discovery across heterogeneous items

mod helpers;

use cdm_metadata::{
    JoinSettings, MarkupRecordStore, MetadataError, MetadataJoinEngine, RecordSource,
    DEFAULT_SEPARATOR,
};
use helpers::fixture_path;

fn export_store() -> MarkupRecordStore {
    MarkupRecordStore::open(fixture_path("export.xml")).expect("Failed to load export.xml")
}

#[test]
fn test_length() {
    let store = export_store();
    assert_eq!(store.len(), 5);
    assert_eq!(store.page_count(), 2);
    assert_eq!(store.parts().count(), 7);
}

#[test]
fn test_get_record() {
    let store = export_store();
    let record = store.get_record(1).unwrap();
    assert_eq!(record.as_list("cdmfile").unwrap(), ["10.jp2".to_string()]);
    assert_eq!(record.id(), Some("1"));
}

#[test]
fn test_get_record_missing() {
    let store = export_store();
    assert!(matches!(
        store.get_record(5),
        Err(MetadataError::RecordNotFound(id)) if id == "5"
    ));
}

#[test]
fn test_compound_item_pages() {
    let store = export_store();
    let record = store.get_record(155).unwrap();
    let pages = record.pages();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].get("pagetitle").unwrap()[0], "Side 1");
    assert_eq!(pages[1].title(), "Side 2");
    assert_eq!(pages[0].pointer(), "153");
    assert_eq!(pages[1].get("cdmid").unwrap(), ["154".to_string()]);
}

#[test]
fn test_page_fields_cleaned() {
    let store = export_store();
    let page = &store.get_record(155).unwrap().pages()[1];
    assert_eq!(
        page.get("description").unwrap(),
        [
            "July through December.".to_string(),
            "Includes award seal in lower corner.".to_string(),
        ]
    );
    // Sibling elements of pagemetadata other than title and pointer are ignored
    assert!(page.get("pagefile").is_none());
}

#[test]
fn test_multi_valued_fields_in_document_order() {
    let store = export_store();
    let record = store.get_record(155).unwrap();

    let descriptions = record.as_list("description").unwrap();
    assert_eq!(descriptions.len(), 3);
    assert_eq!(
        descriptions[0],
        "1998 wall calendar featuring covers of past Coretta Scott King winners. \
         Shades of orange. Laminated, two sided, 6 months on each side."
    );
    assert_eq!(descriptions[1], "26 x 38 in.");
    assert_eq!(descriptions[2], "American Library Association;");

    assert_eq!(
        record.to_record(DEFAULT_SEPARATOR).get("unmapped").unwrap(),
        "ALA0001389; University Archives, Room 19 Library; Drawer 3, Folder 8; RS 12/3/12; 2014-01-22"
    );
}

#[test]
fn test_multiline_text_collapsed() {
    let store = export_store();
    let record = store.get_record(1).unwrap().to_record(DEFAULT_SEPARATOR);
    assert_eq!(
        record.get("description").unwrap(),
        "Mel Gibson in a leather jacket reading Hamlet. Black background with white lettering."
    );
}

#[test]
fn test_fields_union_of_items() {
    let store = export_store();
    let fields = store.fields().unwrap();

    for name in ["title", "unmapped", "cdmid", "cdmoclc", "viewerURL", "contributor"] {
        assert!(fields.contains(&name.to_string()), "missing {name}");
        assert!(store.has_field(name));
    }
    assert!(!store.has_field("pagetitle"));
    assert!(!store.has_field("Title"));
}

#[test]
fn test_item_without_optional_fields() {
    let store = export_store();
    let record = store.get_record(2).unwrap();
    assert!(record.as_list("viewerURL").is_none());
    assert!(matches!(
        record.to_record(DEFAULT_SEPARATOR).get("viewerURL"),
        Err(MetadataError::FieldNotFound(_))
    ));
    assert!(record.pages().is_empty());
}

#[test]
fn test_record_view() {
    let store = export_store();
    let record = store.get_record(155).unwrap().to_record(DEFAULT_SEPARATOR);

    assert_eq!(record.page_count(), 2);
    assert_eq!(record.get("title").unwrap(), "Coretta Scott King Award Calendar, 1998");
    assert_eq!(record.as_list("subject").unwrap(), ["African American authors".to_string()]);
    assert!(record.get("description").unwrap().starts_with("1998 wall calendar"));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        MarkupRecordStore::open("bad_file.xml"),
        Err(MetadataError::InputNotFound(_))
    ));
}

#[test]
fn test_store_and_engine_render_with_same_separator() {
    let settings = JoinSettings {
        separator: ";".to_string(),
        ..Default::default()
    };
    let engine =
        MetadataJoinEngine::with_settings(&[fixture_path("export.xml")], settings.clone()).unwrap();
    let store = engine.markup().unwrap();

    let from_store = store.get_record(155).unwrap().to_record(&settings.separator);
    let from_engine = engine.records()[4].object_level();
    for name in ["unmapped", "description", "title"] {
        assert_eq!(from_store.get(name).unwrap(), from_engine.get(name).unwrap());
    }
    assert_eq!(
        from_engine.get("unmapped").unwrap(),
        "ALA0001389;University Archives, Room 19 Library;Drawer 3, Folder 8;RS 12/3/12;2014-01-22"
    );
}
