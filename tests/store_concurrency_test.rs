//! Concurrent writers against one passkey list

use std::sync::Arc;
use std::thread;

use safe_passkeys::passkey::{
    DocumentStorage, FileStorage, MemoryStorage, PasskeyItem, PasskeyStore, DEFAULT_STORAGE_KEY,
};

const WRITERS: usize = 8;
const APPENDS_PER_WRITER: usize = 10;

#[test]
fn test_unsynchronized_read_modify_write_loses_update() {
    let storage = MemoryStorage::new();
    storage.save(DEFAULT_STORAGE_KEY, "[]").unwrap();

    // Two writers read the same snapshot before either saves
    let snapshot_a = storage.load(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    let snapshot_b = storage.load(DEFAULT_STORAGE_KEY).unwrap().unwrap();

    let write = |snapshot: &str, item: PasskeyItem| {
        let mut list: Vec<PasskeyItem> = serde_json::from_str(snapshot).unwrap();
        list.push(item);
        storage
            .save(DEFAULT_STORAGE_KEY, &serde_json::to_string(&list).unwrap())
            .unwrap();
    };
    write(&snapshot_a, PasskeyItem::new("aa", "01"));
    write(&snapshot_b, PasskeyItem::new("bb", "02"));

    let store = PasskeyStore::new(storage);
    assert_eq!(store.load().unwrap(), vec![PasskeyItem::new("bb", "02")]);
}

fn append_concurrently<S: DocumentStorage + 'static>(store: &Arc<PasskeyStore<S>>) {
    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let store = Arc::clone(store);
            scope.spawn(move || {
                for n in 0..APPENDS_PER_WRITER {
                    let raw_id = format!("{writer:02x}{n:02x}");
                    store.append(PasskeyItem::new(raw_id, "04")).unwrap();
                }
            });
        }
    });
}

fn assert_every_record_kept<S: DocumentStorage>(store: &PasskeyStore<S>) {
    let records = store.load().unwrap();
    assert_eq!(records.len(), WRITERS * APPENDS_PER_WRITER);

    for writer in 0..WRITERS {
        let ids: Vec<&str> = records
            .iter()
            .map(|record| record.raw_id.as_str())
            .filter(|id| id.starts_with(&format!("{writer:02x}")))
            .collect();
        let expected: Vec<String> = (0..APPENDS_PER_WRITER)
            .map(|n| format!("{writer:02x}{n:02x}"))
            .collect();
        // Each writer's records keep their append order
        assert_eq!(ids, expected);
    }
}

#[test]
fn test_concurrent_appends_in_memory_keep_every_record() {
    let store = Arc::new(PasskeyStore::new(MemoryStorage::new()));
    append_concurrently(&store);
    assert_every_record_kept(&store);
}

#[test]
fn test_concurrent_appends_on_disk_keep_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PasskeyStore::new(FileStorage::open(dir.path()).unwrap()));
    append_concurrently(&store);
    assert_every_record_kept(&store);

    let reopened = PasskeyStore::new(FileStorage::open(dir.path()).unwrap());
    assert_eq!(reopened.load().unwrap().len(), WRITERS * APPENDS_PER_WRITER);
}
