//! Integration tests for locating export files

use cdm_common::{find_file_locally, find_files_matching};
use std::fs;
use tempfile::TempDir;

fn build_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("collection").join("batch1");
    fs::create_dir_all(&nested).unwrap();
    fs::create_dir_all(dir.path().join("other")).unwrap();

    fs::write(dir.path().join("export.xml"), "<metadata/>").unwrap();
    fs::write(nested.join("export.xml"), "<metadata/>").unwrap();
    fs::write(nested.join("export.tsv"), "CONTENTdm number\n").unwrap();
    fs::write(dir.path().join("other").join("notes.txt"), "").unwrap();
    dir
}

#[test]
fn test_finds_every_match_by_name() {
    let dir = build_tree();

    let mut found: Vec<_> = find_file_locally("export.xml", dir.path()).collect();
    found.sort();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p.file_name().unwrap() == "export.xml"));
    assert!(found.iter().all(|p| p.starts_with(dir.path())));
}

#[test]
fn test_name_must_match_exactly() {
    let dir = build_tree();
    assert_eq!(find_file_locally("export", dir.path()).count(), 0);
}

#[test]
fn test_directories_are_not_matched() {
    let dir = build_tree();
    assert_eq!(find_file_locally("batch1", dir.path()).count(), 0);
}

#[test]
fn test_predicate_form() {
    let dir = build_tree();

    let tsv: Vec<_> = find_files_matching(dir.path(), |p| {
        p.extension().map(|e| e == "tsv").unwrap_or(false)
    })
    .collect();

    assert_eq!(tsv.len(), 1);
    assert!(tsv[0].ends_with("collection/batch1/export.tsv"));
}
