use forge_studio::{
    ApplicationState, FileStorage, Role, SnapshotStorage, Store, DEFAULT_STORAGE_KEY,
};
use std::sync::Arc;

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));

    let store = Store::open(storage.clone());
    store.set_credential("sk-file").unwrap();
    let first = store.add_artifact("<p>1</p>", "one").unwrap();
    store.add_artifact("<p>2</p>", "two").unwrap();
    store.add_message(Role::User, "one").unwrap();
    store.add_message(Role::Assistant, "<p>1</p>").unwrap();
    store.set_current_artifact(&first).unwrap();
    let expected = store.snapshot();
    drop(store);

    let reopened = Store::open(storage);
    assert_eq!(reopened.snapshot(), expected);
    assert_eq!(reopened.current_artifact().unwrap().prompt, "one");
    assert!(reopened.previous_artifact().is_none());
}

#[test]
fn corrupt_snapshot_file_opens_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    storage.save(DEFAULT_STORAGE_KEY, "{\"artifacts\": [").unwrap();

    let store = Store::open(storage.clone());
    assert_eq!(store.snapshot(), ApplicationState::default());

    store.set_credential("sk").unwrap();
    let raw = storage.load(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    let saved: ApplicationState = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved.api_key, "sk");
}

#[test]
fn imports_snapshot_written_by_the_browser_app() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    storage
        .save(
            DEFAULT_STORAGE_KEY,
            r#"{
                "apiKey": "sk-browser",
                "components": [
                    {"id": "a1", "code": "<p>a</p>", "prompt": "a", "timestamp": 1},
                    {"id": "b2", "code": "<p>b</p>", "prompt": "b", "timestamp": 2}
                ],
                "currentComponentId": "b2",
                "conversation": []
            }"#,
        )
        .unwrap();

    let store = Store::open(storage);

    assert_eq!(store.credential(), "sk-browser");
    assert_eq!(store.current_artifact().unwrap().source_text, "<p>b</p>");
    assert_eq!(store.previous_artifact().unwrap().id, "a1");
}
