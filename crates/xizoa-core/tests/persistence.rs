use pretty_assertions::assert_eq;
use xizoa_core::persistence::{DEFAULT_APP_KEY, EXPORT_MIME_TYPE};
use xizoa_core::{
    DirStore, KeyValueStore, LanguageTag, MemoryStore, PersistenceAdapter, Project, ProjectFile,
    SnapshotError, StorageError,
};

fn sample() -> Project {
    let mut project = Project::new();
    project
        .create_file("index.html", "<html><head></head><body>\"quoted\" \u{1F600}</body></html>")
        .unwrap();
    project.create_file("z.js", "let a = 1;\n").unwrap();
    project.create_file("a.css", "").unwrap();
    project.create_file("notes", "line 1\nline 2").unwrap();
    project
}

#[test]
fn test_export_then_import_round_trips() {
    let adapter = PersistenceAdapter::new(MemoryStore::new(), DEFAULT_APP_KEY);
    let project = sample();

    let blob = adapter.export_snapshot(&project).unwrap();
    let imported = adapter.import_snapshot(&blob.text()).unwrap();

    assert_eq!(imported, project);
    assert_eq!(
        imported.file_names().collect::<Vec<_>>(),
        ["index.html", "z.js", "a.css", "notes"]
    );
}

#[test]
fn test_export_is_pretty_printed_json() {
    let adapter = PersistenceAdapter::new(MemoryStore::new(), DEFAULT_APP_KEY)
        .with_export_filename("out.json");
    let mut project = Project::new();
    project.create_file("a.js", "x").unwrap();

    let blob = adapter.export_snapshot(&project).unwrap();
    assert_eq!(blob.filename, "out.json");
    assert_eq!(blob.mime_type, EXPORT_MIME_TYPE);
    assert_eq!(
        blob.text(),
        "{\n  \"a.js\": {\n    \"language\": \"javascript\",\n    \"content\": \"x\"\n  }\n}"
    );
}

#[test]
fn test_legacy_string_entries_are_normalized() {
    let adapter = PersistenceAdapter::new(MemoryStore::new(), DEFAULT_APP_KEY);

    let project = adapter
        .import_snapshot(r#"{"a.js": "console.log(1)"}"#)
        .unwrap();
    assert_eq!(
        project.get("a.js"),
        Some(&ProjectFile::new(LanguageTag::Javascript, "console.log(1)"))
    );

    let mixed = adapter
        .import_snapshot(
            r#"{"index.html": "<h1>x</h1>", "s.css": {"language": "css", "content": "p{}"}, "t.txt": "t"}"#,
        )
        .unwrap();
    assert_eq!(
        mixed.file_names().collect::<Vec<_>>(),
        ["index.html", "s.css", "t.txt"]
    );
    assert_eq!(mixed.get("index.html").unwrap().language, LanguageTag::Html);
    assert_eq!(mixed.get("t.txt").unwrap().language, LanguageTag::Plaintext);
}

#[test]
fn test_import_rejects_malformed_payloads() {
    let adapter = PersistenceAdapter::new(MemoryStore::new(), DEFAULT_APP_KEY);

    assert!(matches!(
        adapter.import_snapshot("not json"),
        Err(SnapshotError::Parse(_))
    ));
    assert!(matches!(
        adapter.import_snapshot("\"just a string\""),
        Err(SnapshotError::NotAnObject)
    ));
    assert!(matches!(
        adapter.import_snapshot(r#"{"a.js": [1]}"#),
        Err(SnapshotError::InvalidEntry { .. })
    ));
}

#[test]
fn test_save_overwrites_and_load_reads_back() {
    let mut adapter = PersistenceAdapter::new(MemoryStore::new(), "key");

    adapter.save_local(&Project::starter()).unwrap();
    adapter.save_local(&sample()).unwrap();

    assert_eq!(adapter.load_local(), Some(sample()));
    // Saved compactly, not pretty-printed.
    assert!(!adapter.store().raw("key").unwrap().contains('\n'));
}

#[test]
fn test_load_fails_soft() {
    let absent = PersistenceAdapter::new(MemoryStore::new(), "key");
    assert_eq!(absent.load_local(), None);

    let corrupt = PersistenceAdapter::new(MemoryStore::new().with_entry("key", "{oops"), "key");
    assert_eq!(corrupt.load_local(), None);

    let empty = PersistenceAdapter::new(MemoryStore::new().with_entry("key", "{}"), "key");
    assert_eq!(empty.load_local(), None);

    let unavailable = PersistenceAdapter::new(MemoryStore::unavailable(), "key");
    assert_eq!(unavailable.load_local(), None);
}

#[test]
fn test_load_accepts_older_lang_field() {
    let adapter = PersistenceAdapter::new(
        MemoryStore::new().with_entry(
            "key",
            r#"{"index.html": {"lang": "html", "content": "<p>old</p>"}}"#,
        ),
        "key",
    );

    let project = adapter.load_local().unwrap();
    assert_eq!(
        project.get("index.html"),
        Some(&ProjectFile::new(LanguageTag::Html, "<p>old</p>"))
    );
}

#[test]
fn test_save_reports_unavailable_store() {
    let mut adapter = PersistenceAdapter::new(MemoryStore::unavailable(), "key");
    assert!(matches!(
        adapter.save_local(&Project::starter()),
        Err(StorageError::Unavailable(_))
    ));
}

#[test]
fn test_dir_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    let mut store = DirStore::new(&root);

    assert_eq!(store.get("xizoa-advanced-v1").unwrap(), None);
    store.set("xizoa-advanced-v1", "{\"a\":\"b\"}").unwrap();
    assert_eq!(
        store.get("xizoa-advanced-v1").unwrap().as_deref(),
        Some("{\"a\":\"b\"}")
    );
    assert!(root.join("xizoa-advanced-v1.json").exists());

    // Keys are mapped to safe file names.
    store.set("../escape", "x").unwrap();
    assert!(root.join(".._escape.json").exists());

    let mut adapter = PersistenceAdapter::new(store, DEFAULT_APP_KEY);
    adapter.save_local(&sample()).unwrap();
    assert_eq!(adapter.load_local(), Some(sample()));
}
