use molt::{DocumentStore, StoreLocation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Counter {
    count: i64,
}

const GARBAGE: &str = "this is { not json at all ]]";

fn backup_names(directory: &Path, stem: &str) -> Vec<String> {
    let mut names = Vec::new();
    for entry in fs::read_dir(directory).unwrap() {
        let os_name = entry.unwrap().file_name();
        let name = os_name.to_string_lossy().into_owned();
        let Some(rest) = name
            .strip_prefix(stem)
            .and_then(|r| r.strip_prefix('-'))
            .and_then(|r| r.strip_suffix(".json"))
        else {
            continue;
        };
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '-') {
            names.push(name);
        }
    }
    names
}

#[test]
fn test_corrupt_file_is_backed_up_and_replaced_by_default() {
    let tmp = tempfile::tempdir().unwrap();
    let location = StoreLocation::settings_path(tmp.path(), "counter");
    fs::create_dir_all(location.directory_path()).unwrap();
    fs::write(location.file_path(), GARBAGE).unwrap();

    let store: DocumentStore<Counter> = DocumentStore::new(location.clone(), "1.0.0");
    let loaded = store.load();
    assert_eq!(loaded, Counter::default());

    // Exactly one backup, carrying the original bytes.
    let backups = backup_names(location.directory_path(), "counter");
    assert_eq!(backups.len(), 1);
    let backup_path = location.directory_path().join(&backups[0]);
    assert_eq!(fs::read_to_string(backup_path).unwrap(), GARBAGE);

    // The main path now holds a valid default.
    let text = fs::read_to_string(location.file_path()).unwrap();
    let parsed: Counter = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, Counter::default());
}

#[test]
fn test_repeated_corruption_accumulates_backups() {
    let tmp = tempfile::tempdir().unwrap();
    let location = StoreLocation::settings_path(tmp.path(), "counter");
    fs::create_dir_all(location.directory_path()).unwrap();

    for round in 0..3 {
        fs::write(location.file_path(), format!("{GARBAGE} #{round}")).unwrap();
        let store: DocumentStore<Counter> = DocumentStore::new(location.clone(), "1.0.0");
        store.load();
    }

    assert_eq!(backup_names(location.directory_path(), "counter").len(), 3);
}

#[test]
fn test_successful_save_takes_no_backup() {
    let tmp = tempfile::tempdir().unwrap();
    let location = StoreLocation::settings_path(tmp.path(), "counter");

    let store: DocumentStore<Counter> = DocumentStore::new(location.clone(), "1.0.0");
    store.load();
    for count in 1..=5 {
        store.update(|c| c.count = count);
        store.save();
    }

    // load() on the missing file persisted a default without backing
    // anything up, and normal saves never back up either.
    assert!(backup_names(location.directory_path(), "counter").is_empty());
}
