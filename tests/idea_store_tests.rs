use chrono::DateTime;
use product_analysis_lib::file_storage::ideas::IdeaStore;
use product_analysis_lib::file_storage::StorageError;
use tempfile::TempDir;

#[test]
fn append_then_read_back_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let store = IdeaStore::new(temp_dir.path().join("ideas.json"));

    store.append("A bike lock that texts you").unwrap();
    let stored = store.append("Smart plant pot").unwrap();

    let ideas = store.read_all().unwrap();
    assert_eq!(ideas.len(), 2);
    let last = ideas.last().unwrap();
    assert_eq!(last.text, "Smart plant pot");
    assert_eq!(last.submitted_at, stored.submitted_at);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    let record = &raw.as_array().unwrap()[1];
    assert_eq!(record["idea"], "Smart plant pot");
    let timestamp = record["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[test]
fn reads_legacy_log_with_naive_timestamps() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ideas.json");
    std::fs::write(
        &path,
        r#"[{"idea": "Old idea", "timestamp": "2024-05-01T09:30:00.123456"}]"#,
    )
    .unwrap();
    let store = IdeaStore::new(&path);

    store.append("New idea").unwrap();

    let ideas = store.read_all().unwrap();
    assert_eq!(ideas.len(), 2);
    assert_eq!(ideas[0].text, "Old idea");
    assert_eq!(ideas[1].text, "New idea");
}

#[test]
fn corrupt_log_is_a_hard_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ideas.json");
    std::fs::write(&path, "{ not a list").unwrap();

    let err = IdeaStore::new(&path).append("Anything").unwrap_err();
    assert!(matches!(err, StorageError::Parse { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not a list");
}
