use boxfile::engine::{
    MimeProbe, Reconciler, Reconciliation, UNKNOWN_CONTENT_TYPE, format_size, glob_match, hash_bytes, hash_file, hash_file_chunked,
    hash_reader, has_ignored_component, mtime_changed, should_include_in_walk, should_index,
};
use boxfile::index::{merge_hashed_file, sweep_unseen};
use boxfile::{
    FileMeta, FileStatus, Index, IndexEntry, IndexFilters, IndexSummary, digest_prefix,
    path_to_index_string,
};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

const EMPTY_DIGEST: &str = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";

fn meta(size: u64, mtime: i64) -> FileMeta {
    FileMeta {
        size,
        content_type: "text/plain".to_string(),
        created_at_ns: 1,
        modified_at_ns: mtime,
    }
}

// --- glob_match ---

#[test]
fn test_glob_exact() {
    assert!(glob_match("node_modules", "node_modules"));
    assert!(!glob_match("node_modules", "node_module"));
}

#[test]
fn test_glob_star() {
    assert!(glob_match("*.tmp", "cache.tmp"));
    assert!(glob_match("build*", "build"));
    assert!(!glob_match("*.tmp", "cache.txt"));
}

#[test]
fn test_glob_question_mark() {
    assert!(glob_match("v?nv", "venv"));
    assert!(!glob_match("v?nv", "vnv"));
}

// --- walk pruning ---

#[test]
fn test_ignored_component_below_root() {
    let root = PathBuf::from("/data");
    let ignored = vec![".git".to_string(), "__pycache__".to_string()];
    assert!(has_ignored_component(
        &PathBuf::from("/data/.git/objects/ab"),
        &root,
        &ignored
    ));
    assert!(has_ignored_component(
        &PathBuf::from("/data/src/__pycache__/m.pyc"),
        &root,
        &ignored
    ));
    assert!(!has_ignored_component(
        &PathBuf::from("/data/src/git.rs"),
        &root,
        &ignored
    ));
}

#[test]
fn test_ignored_name_above_root_does_not_count() {
    let root = PathBuf::from("/home/.git/work");
    let ignored = vec![".git".to_string()];
    assert!(!has_ignored_component(
        &PathBuf::from("/home/.git/work/a.txt"),
        &root,
        &ignored
    ));
}

#[test]
fn test_should_include_in_walk_excludes_root() {
    let root = PathBuf::from("/data");
    assert!(!should_include_in_walk(&root, &root, &[]));
    assert!(should_include_in_walk(&PathBuf::from("/data/a"), &root, &[]));
}

// --- mtime tolerance ---

#[test]
fn test_mtime_within_tolerance() {
    assert!(!mtime_changed(1_000_500_000, 1_000_000_000, 1_000_000));
    assert!(!mtime_changed(1_000_000_000, 1_000_500_000, 1_000_000));
}

#[test]
fn test_mtime_beyond_tolerance() {
    assert!(mtime_changed(1_002_000_000, 1_000_000_000, 1_000_000));
}

#[test]
fn test_mtime_extreme_values_do_not_overflow() {
    assert!(mtime_changed(i64::MAX, i64::MIN, 1_000_000));
    assert!(mtime_changed(i64::MIN, i64::MAX, 1_000_000));
    assert!(!mtime_changed(i64::MIN, i64::MIN, 0));
}

// --- hashing ---

#[test]
fn test_hash_empty_input() {
    assert_eq!(hash_bytes(b""), EMPTY_DIGEST);
    assert_eq!(hash_reader(std::io::empty(), 16).unwrap(), EMPTY_DIGEST);
}

#[test]
fn test_hash_is_lowercase_hex() {
    let d = hash_bytes(b"hello");
    assert_eq!(d.len(), 64);
    assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_hash_independent_of_chunk_size() {
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let whole = hash_bytes(&data);
    for chunk in [1, 7, 4096, 1 << 20] {
        assert_eq!(hash_reader(&data[..], chunk).unwrap(), whole);
    }
}

#[test]
fn test_hash_file_matches_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("f.bin");
    fs::write(&p, b"some content").unwrap();
    assert_eq!(hash_file(&p).unwrap(), hash_bytes(b"some content"));
    assert_eq!(hash_file_chunked(&p, 3).unwrap(), hash_bytes(b"some content"));
}

#[test]
fn test_hash_missing_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(hash_file(&dir.path().join("nope")).is_err());
}

#[test]
fn test_digest_prefix() {
    assert_eq!(digest_prefix(EMPTY_DIGEST), "af1349b9");
    assert_eq!(digest_prefix("abc"), "abc");
}

// --- filters ---

#[test]
fn test_filters_normalize_extensions() {
    let f = IndexFilters::new(Some(vec!["JPG".into(), ".png".into()]), 0, None);
    assert_eq!(f.extensions, Some(vec![".jpg".to_string(), ".png".to_string()]));
    assert!(IndexFilters::new(Some(vec![]), 0, None).is_unrestricted());
}

#[test]
fn test_should_index_extension_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let jpg = dir.path().join("photo.JPG");
    let txt = dir.path().join("notes.txt");
    fs::write(&jpg, vec![0u8; 100]).unwrap();
    fs::write(&txt, vec![0u8; 100]).unwrap();

    let by_ext = IndexFilters::new(Some(vec!["jpg".into()]), 0, None);
    assert!(should_index(&jpg, &by_ext));
    assert!(!should_index(&txt, &by_ext));

    let by_size = IndexFilters::new(None, 101, None);
    assert!(!should_index(&jpg, &by_size));
    assert!(should_index(&jpg, &IndexFilters::new(None, 100, None)));
}

#[test]
fn test_should_index_after_date() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("a.txt");
    fs::write(&p, b"x").unwrap();
    assert!(should_index(&p, &IndexFilters::new(None, 0, Some(0))));
    assert!(!should_index(&p, &IndexFilters::new(None, 0, Some(i64::MAX))));
}

#[cfg(unix)]
#[test]
fn test_should_index_rejects_symlink() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a.txt");
    let link = dir.path().join("b.txt");
    fs::write(&target, b"x").unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();
    assert!(should_index(&target, &IndexFilters::default()));
    assert!(!should_index(&link, &IndexFilters::default()));
}

#[test]
fn test_should_index_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    assert!(!should_index(&dir.path().join("gone"), &IndexFilters::default()));
}

// --- reconciliation ---

fn index_with(path: &str, size: u64, mtime: i64) -> Index {
    let mut index = Index::new();
    index.insert("d1".to_string(), IndexEntry::new(&meta(size, mtime), path.to_string()));
    index
}

#[test]
fn test_reconcile_unknown_path_needs_hash() {
    let r = Reconciler::from_index(&Index::new());
    assert!(r.is_empty());
    assert_eq!(r.classify_signature("/a", 0, 0), Reconciliation::NeedsHash);
}

#[test]
fn test_reconcile_unchanged_within_tolerance() {
    let r = Reconciler::from_index(&index_with("/a", 10, 5_000_000_000));
    assert_eq!(
        r.classify_signature("/a", 5_000_000_500, 10),
        Reconciliation::Unchanged
    );
    assert_eq!(r.previous_digest("/a"), Some("d1"));
}

#[test]
fn test_reconcile_size_or_mtime_change() {
    let r = Reconciler::from_index(&index_with("/a", 10, 5_000_000_000));
    assert_eq!(
        r.classify_signature("/a", 5_000_000_000, 11),
        Reconciliation::NeedsHash
    );
    assert_eq!(
        r.classify_signature("/a", 5_010_000_000, 10),
        Reconciliation::NeedsHash
    );
}

#[test]
fn test_reconcile_custom_tolerance() {
    let r = Reconciler::from_index(&index_with("/a", 10, 5_000_000_000)).with_tolerance_ns(0);
    assert_eq!(
        r.classify_signature("/a", 5_000_000_001, 10),
        Reconciliation::NeedsHash
    );
    assert_eq!(
        r.classify_signature("/a", 5_000_000_000, 10),
        Reconciliation::Unchanged
    );

    let loose = Reconciler::from_index(&index_with("/a", 10, 5_000_000_000))
        .with_tolerance_ns(2_000_000_000);
    assert_eq!(
        loose.classify_signature("/a", 6_000_000_000, 10),
        Reconciliation::Unchanged
    );
}

#[test]
fn test_reconcile_uses_per_path_mtime() {
    let mut index = index_with("/a", 10, 100_000_000_000);
    index
        .get_mut("d1")
        .unwrap()
        .observe("/b".to_string(), 200_000_000_000);
    let r = Reconciler::from_index(&index);
    assert_eq!(
        r.classify_signature("/a", 100_000_000_000, 10),
        Reconciliation::Unchanged
    );
    assert_eq!(
        r.classify_signature("/b", 200_000_000_000, 10),
        Reconciliation::Unchanged
    );
}

// --- entry bookkeeping ---

#[test]
fn test_observe_appends_once() {
    let mut e = IndexEntry::new(&meta(3, 1), "/a".to_string());
    e.observe("/b".to_string(), 2);
    e.observe("/b".to_string(), 3);
    assert_eq!(e.paths, vec!["/a", "/b"]);
    assert_eq!(e.modified_at_ns, 3);
    assert_eq!(e.canonical_path(), Some("/a"));
    assert!(e.is_duplicated());
}

#[test]
fn test_retain_paths_drops_mtimes() {
    let mut e = IndexEntry::new(&meta(3, 1), "/a".to_string());
    e.observe("/b".to_string(), 2);
    assert_eq!(e.retain_paths(|p| p != "/a"), 1);
    assert_eq!(e.paths, vec!["/b"]);
    assert!(!e.path_mtimes_ns.contains_key("/a"));
}

#[test]
fn test_merge_new_and_existing_digest() {
    let mut index = Index::new();
    merge_hashed_file(&mut index, "d1".into(), &meta(3, 1), "/a".into(), None);
    merge_hashed_file(&mut index, "d1".into(), &meta(3, 9), "/b".into(), None);
    merge_hashed_file(&mut index, "d1".into(), &meta(3, 9), "/b".into(), None);
    let e = &index["d1"];
    assert_eq!(e.paths, vec!["/a", "/b"]);
    assert_eq!(e.modified_at_ns, 9);
    assert_eq!(e.created_at_ns, 1);
}

#[test]
fn test_merge_detaches_rehashed_path() {
    let mut index = Index::new();
    merge_hashed_file(&mut index, "old".into(), &meta(3, 1), "/a".into(), None);
    merge_hashed_file(&mut index, "old".into(), &meta(3, 1), "/b".into(), None);
    merge_hashed_file(&mut index, "new".into(), &meta(4, 2), "/a".into(), Some("old"));
    assert_eq!(index["old"].paths, vec!["/b"]);
    assert_eq!(index["new"].paths, vec!["/a"]);

    merge_hashed_file(&mut index, "new".into(), &meta(4, 2), "/b".into(), Some("old"));
    assert!(!index.contains_key("old"));
    assert_eq!(index["new"].paths, vec!["/a", "/b"]);
}

#[test]
fn test_sweep_unseen() {
    let mut index = Index::new();
    merge_hashed_file(&mut index, "d1".into(), &meta(3, 1), "/a".into(), None);
    merge_hashed_file(&mut index, "d1".into(), &meta(3, 1), "/b".into(), None);
    merge_hashed_file(&mut index, "d2".into(), &meta(5, 1), "/c".into(), None);
    let seen: HashSet<String> = ["/b".to_string()].into_iter().collect();
    assert_eq!(sweep_unseen(&mut index, &seen), 2);
    assert_eq!(index.len(), 1);
    assert_eq!(index["d1"].paths, vec!["/b"]);
}

#[test]
fn test_summary_record() {
    let mut s = IndexSummary::default();
    s.record(FileStatus::Indexed);
    s.record(FileStatus::Skipped);
    s.record(FileStatus::Skipped);
    s.record(FileStatus::Ignored);
    assert_eq!((s.indexed, s.skipped, s.failed, s.ignored), (1, 2, 0, 1));
}

// --- content type and path strings ---

#[test]
fn test_mime_content_type() {
    assert_eq!(MimeProbe::content_type(&PathBuf::from("/x/notes.txt")), "text/plain");
    assert_eq!(MimeProbe::content_type(&PathBuf::from("/x/photo.JPG")), "image/jpeg");
    assert_eq!(
        MimeProbe::content_type(&PathBuf::from("/x/Makefile")),
        UNKNOWN_CONTENT_TYPE
    );
    assert_eq!(
        MimeProbe::content_type(&PathBuf::from("/x/blob.zzqqxx")),
        UNKNOWN_CONTENT_TYPE
    );
}

#[test]
fn test_path_to_index_string_utf8() {
    assert_eq!(
        path_to_index_string(&PathBuf::from("/data/ünï.txt")),
        Some("/data/ünï.txt".to_string())
    );
}

#[cfg(unix)]
#[test]
fn test_path_to_index_string_rejects_non_utf8() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    let path = PathBuf::from(OsStr::from_bytes(b"/data/bad\xff.txt"));
    assert_eq!(path_to_index_string(&path), None);
}

// --- format_size ---

#[test]
fn test_format_size() {
    assert_eq!(format_size(0), "0.00 B");
    assert_eq!(format_size(1536), "1.50 KB");
    assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
}
