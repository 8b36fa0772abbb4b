use molt::{DocumentStore, StoreKind, StoreLocation, VersionTracker};
use serde::{Deserialize, Serialize};
use std::fs;
use std::thread;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Counter {
    count: i64,
    payload: String,
}

#[test]
fn test_concurrent_saves_leave_exactly_one_attempted_value() {
    let tmp = tempfile::tempdir().unwrap();
    let location = StoreLocation::settings_path(tmp.path(), "counter");
    let store: DocumentStore<Counter> = DocumentStore::new(location.clone(), "1.0.0");
    store.load();

    // Large payloads make torn writes observable as parse failures.
    let threads = 8;
    thread::scope(|scope| {
        for i in 0..threads {
            let store = &store;
            scope.spawn(move || {
                for round in 0..20 {
                    store.update(|c| {
                        c.count = i;
                        c.payload = format!("thread-{i}-round-{round}-").repeat(200);
                    });
                    store.save();
                }
            });
        }
    });

    let text = fs::read_to_string(location.file_path()).unwrap();
    let parsed: Counter = serde_json::from_str(&text).unwrap();
    assert!((0..threads).contains(&parsed.count));
    assert!(parsed.payload.contains(&format!("thread-{}-", parsed.count)));
}

#[test]
fn test_concurrent_saves_and_fingerprint_writes_stay_coherent() {
    let tmp = tempfile::tempdir().unwrap();
    let location = StoreLocation::settings_path(tmp.path(), "counter");
    let store: DocumentStore<Counter> = DocumentStore::new(location.clone(), "1.0.0");
    store.load();

    thread::scope(|scope| {
        for i in 0..4 {
            let store = &store;
            scope.spawn(move || {
                for _ in 0..10 {
                    store.update(|c| c.count = i);
                    store.save();
                    store.save_information_file(&Counter::default());
                }
            });
        }
    });

    // Both files parse cleanly after the dust settles.
    let text = fs::read_to_string(location.file_path()).unwrap();
    serde_json::from_str::<Counter>(&text).unwrap();

    let tracker = VersionTracker::new(location.file_path(), StoreKind::Json, "1.0.0");
    let information = tracker.read_information().unwrap();
    let recorded: Counter = serde_json::from_str(&information.default_content).unwrap();
    assert_eq!(recorded, Counter::default());
}
