use boxfile::utils::config::PackagePaths;
use boxfile::{FileMeta, Index, IndexEntry, load_index, save_index};
use std::fs;

fn sample_index() -> Index {
    let meta = FileMeta {
        size: 12,
        content_type: "text/plain".to_string(),
        created_at_ns: 1_700_000_000_000_000_000,
        modified_at_ns: 1_700_000_000_500_000_000,
    };
    let mut entry = IndexEntry::new(&meta, "/data/a.txt".to_string());
    entry.observe("/data/b.txt".to_string(), 1_700_000_001_000_000_000);
    let mut index = Index::new();
    index.insert("ab".repeat(32), entry);
    index
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    let index = sample_index();
    save_index(&index, &path).unwrap();
    assert_eq!(load_index(&path), index);
}

#[test]
fn test_save_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    save_index(&sample_index(), &a).unwrap();
    save_index(&sample_index(), &b).unwrap();
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn test_save_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    save_index(&sample_index(), &path).unwrap();
    save_index(&Index::new(), &path).unwrap();
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["index.json".to_string()]);
    assert!(load_index(&path).is_empty());
}

#[test]
fn test_save_creates_parent_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("index.json");
    save_index(&sample_index(), &path).unwrap();
    assert_eq!(load_index(&path).len(), 1);
}

#[test]
fn test_load_missing_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_index(&dir.path().join("absent.json")).is_empty());
}

#[test]
fn test_load_corrupt_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    fs::write(&path, b"{ not json").unwrap();
    assert!(load_index(&path).is_empty());
}

#[test]
fn test_load_from_repository_root() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = PackagePaths::get().index_path(dir.path());
    save_index(&sample_index(), &index_path).unwrap();
    assert_eq!(load_index(dir.path()), sample_index());
}

#[test]
fn test_document_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    save_index(&sample_index(), &path).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let entry = &value["ab".repeat(32)];
    assert_eq!(entry["size"], 12);
    assert_eq!(entry["content_type"], "text/plain");
    assert_eq!(entry["paths"][0], "/data/a.txt");
    assert_eq!(entry["paths"][1], "/data/b.txt");
    assert!(entry["created_at_ns"].is_i64());
    assert!(entry["modified_at_ns"].is_i64());
}

#[test]
fn test_load_document_without_path_mtimes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    fs::write(
        &path,
        br#"{"d1":{"size":1,"content_type":"unknown","created_at_ns":5,"modified_at_ns":7,"paths":["/x"]}}"#,
    )
    .unwrap();
    let index = load_index(&path);
    assert_eq!(index["d1"].path_mtime_ns("/x"), 7);
}
