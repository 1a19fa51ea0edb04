use crate::{
    errors::{StoreError, StoreResult},
    id::{generate_id, now_millis},
    storage::SnapshotStorage,
    types::{ApplicationState, Artifact, Message, Role},
};
use forge_llm::ChatMessage;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Storage key the session snapshot is written under.
pub const DEFAULT_STORAGE_KEY: &str = "componentForgeState";

/// Single source of truth for session state.
///
/// Every mutation is applied to a copy of the state, written through the
/// storage, and only then committed. A failed write leaves the in-memory
/// state untouched. All operations are serialized by one lock, which is never
/// held across an await point.
pub struct Store {
    state: Mutex<ApplicationState>,
    storage: Arc<dyn SnapshotStorage>,
    key: String,
}

impl Store {
    /// Open the store under [`DEFAULT_STORAGE_KEY`].
    pub fn open(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self::open_with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Rehydrate from `key`, falling back to the empty state when nothing
    /// usable is stored.
    pub fn open_with_key(storage: Arc<dyn SnapshotStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = load_state(storage.as_ref(), &key);
        Self {
            state: Mutex::new(state),
            storage,
            key,
        }
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    fn lock(&self) -> MutexGuard<'_, ApplicationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` to a copy of the state, persist the copy, then commit it.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut ApplicationState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.lock();
        let mut next = guard.clone();
        let output = f(&mut next)?;
        let contents = serde_json::to_string(&next)?;
        self.storage.save(&self.key, &contents)?;
        *guard = next;
        Ok(output)
    }

    /// Replace the stored API credential. No validation is performed.
    pub fn set_credential(&self, value: impl Into<String>) -> StoreResult<()> {
        let value = value.into();
        self.update(|state| {
            state.api_key = value;
            Ok(())
        })
    }

    /// Append a new artifact, make it current, and return its id.
    pub fn add_artifact(
        &self,
        source_text: impl Into<String>,
        prompt: impl Into<String>,
    ) -> StoreResult<String> {
        let artifact = Artifact {
            id: generate_id(),
            source_text: source_text.into(),
            prompt: prompt.into(),
            created_at: now_millis(),
        };
        self.update(|state| {
            state.current_artifact_id = Some(artifact.id.clone());
            state.artifacts.push(artifact.clone());
            Ok(())
        })?;
        tracing::debug!(artifact_id = %artifact.id, "artifact added");
        Ok(artifact.id)
    }

    /// Record a completed generation in one write: the artifact becomes
    /// current and the prompt and reply are appended as a user turn followed
    /// by an assistant turn. On failure none of the three is kept.
    pub fn record_generation(
        &self,
        source_text: impl Into<String>,
        prompt: impl Into<String>,
    ) -> StoreResult<Artifact> {
        let created_at = now_millis();
        let artifact = Artifact {
            id: generate_id(),
            source_text: source_text.into(),
            prompt: prompt.into(),
            created_at,
        };
        let user_turn = Message {
            id: generate_id(),
            role: Role::User,
            content: artifact.prompt.clone(),
            created_at,
        };
        let assistant_turn = Message {
            id: generate_id(),
            role: Role::Assistant,
            content: artifact.source_text.clone(),
            created_at,
        };
        self.update(|state| {
            state.current_artifact_id = Some(artifact.id.clone());
            state.artifacts.push(artifact.clone());
            state.conversation.push(user_turn);
            state.conversation.push(assistant_turn);
            Ok(())
        })?;
        tracing::debug!(artifact_id = %artifact.id, "generation recorded");
        Ok(artifact)
    }

    /// Point the current pointer at an existing artifact.
    ///
    /// Unknown ids are rejected with [`StoreError::UnknownArtifact`] and the
    /// state is left unchanged.
    pub fn set_current_artifact(&self, id: &str) -> StoreResult<()> {
        self.update(|state| {
            if state.find_artifact(id).is_none() {
                return Err(StoreError::UnknownArtifact(id.to_string()));
            }
            state.current_artifact_id = Some(id.to_string());
            Ok(())
        })
    }

    /// Move the current pointer back one artifact and return that artifact.
    /// Nothing is written when there is no previous artifact.
    pub fn revert_to_previous(&self) -> StoreResult<Option<Artifact>> {
        let Some(previous) = self.previous_artifact() else {
            return Ok(None);
        };
        self.set_current_artifact(&previous.id)?;
        Ok(Some(previous))
    }

    /// Append a conversation turn and return its id.
    pub fn add_message(&self, role: Role, content: impl Into<String>) -> StoreResult<String> {
        let message = Message {
            id: generate_id(),
            role,
            content: content.into(),
            created_at: now_millis(),
        };
        let id = message.id.clone();
        self.update(|state| {
            state.conversation.push(message);
            Ok(())
        })?;
        Ok(id)
    }

    /// Empty the conversation. Artifacts and the current pointer are kept.
    pub fn clear_conversation(&self) -> StoreResult<()> {
        self.update(|state| {
            state.conversation.clear();
            Ok(())
        })
    }

    /// A copy of the whole state.
    pub fn snapshot(&self) -> ApplicationState {
        self.lock().clone()
    }

    pub fn credential(&self) -> String {
        self.lock().api_key.clone()
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        self.lock().artifacts.clone()
    }

    pub fn current_artifact_id(&self) -> Option<String> {
        self.lock().current_artifact_id.clone()
    }

    pub fn conversation(&self) -> Vec<Message> {
        self.lock().conversation.clone()
    }

    pub fn current_artifact(&self) -> Option<Artifact> {
        self.lock().current_artifact().cloned()
    }

    pub fn previous_artifact(&self) -> Option<Artifact> {
        self.lock().previous_artifact().cloned()
    }

    /// The conversation replayed as completion-request turns.
    pub fn conversation_history(&self) -> Vec<ChatMessage> {
        self.lock().conversation_history()
    }
}

fn load_state(storage: &dyn SnapshotStorage, key: &str) -> ApplicationState {
    let contents = match storage.load(key) {
        Ok(Some(contents)) => contents,
        Ok(None) => return ApplicationState::default(),
        Err(error) => {
            tracing::warn!(%error, key, "failed to read saved state");
            return ApplicationState::default();
        }
    };

    let mut state: ApplicationState = match serde_json::from_str(&contents) {
        Ok(state) => state,
        Err(error) => {
            tracing::warn!(%error, key, "failed to parse saved state");
            return ApplicationState::default();
        }
    };

    if let Some(id) = &state.current_artifact_id {
        if state.find_artifact(id).is_none() {
            tracing::warn!(
                artifact_id = %id,
                key,
                "saved current artifact not found, clearing pointer"
            );
            state.current_artifact_id = None;
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::StorageError, storage::MemoryStorage};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn memory_store() -> (Arc<MemoryStorage>, Store) {
        let storage = Arc::new(MemoryStorage::new());
        let store = Store::open(storage.clone());
        (storage, store)
    }

    fn saved_state(storage: &MemoryStorage) -> ApplicationState {
        serde_json::from_str(&storage.get(DEFAULT_STORAGE_KEY).unwrap()).unwrap()
    }

    #[test]
    fn starts_empty_without_saved_state() {
        let (_, store) = memory_store();
        assert_eq!(store.snapshot(), ApplicationState::default());
        assert!(store.current_artifact().is_none());
        assert!(store.previous_artifact().is_none());
    }

    #[test]
    fn add_artifact_appends_and_sets_current() {
        let (storage, store) = memory_store();

        for n in 1..=4 {
            let id = store
                .add_artifact(format!("<p>{n}</p>"), format!("prompt {n}"))
                .unwrap();
            let artifacts = store.artifacts();
            assert_eq!(artifacts.len(), n);
            assert_eq!(artifacts.last().unwrap().id, id);
            assert_eq!(store.current_artifact_id().as_deref(), Some(id.as_str()));
            assert_eq!(saved_state(&storage), store.snapshot());
        }

        let artifacts = store.artifacts();
        assert_eq!(artifacts[0].prompt, "prompt 1");
        assert_eq!(artifacts[3].source_text, "<p>4</p>");
        assert_eq!(store.previous_artifact().unwrap().id, artifacts[2].id);
    }

    #[test]
    fn set_credential_persists() {
        let (storage, store) = memory_store();
        store.set_credential("sk-123").unwrap();

        assert_eq!(store.credential(), "sk-123");
        assert_eq!(saved_state(&storage).api_key, "sk-123");
    }

    #[test]
    fn set_current_artifact_moves_pointer() {
        let (_, store) = memory_store();
        let first = store.add_artifact("a", "a").unwrap();
        let second = store.add_artifact("b", "b").unwrap();

        store.set_current_artifact(&first).unwrap();
        assert_eq!(store.current_artifact().unwrap().id, first);
        assert!(store.previous_artifact().is_none());

        store.set_current_artifact(&second).unwrap();
        assert_eq!(store.previous_artifact().unwrap().id, first);
    }

    #[test]
    fn set_current_artifact_rejects_unknown_id() {
        let (storage, store) = memory_store();
        let id = store.add_artifact("a", "a").unwrap();

        let error = store.set_current_artifact("nope").unwrap_err();
        assert!(matches!(error, StoreError::UnknownArtifact(ref missing) if missing == "nope"));
        assert_eq!(store.current_artifact_id(), Some(id.clone()));
        assert_eq!(saved_state(&storage).current_artifact_id, Some(id));
    }

    #[test]
    fn revert_to_previous_walks_back_through_history() {
        let (_, store) = memory_store();
        assert!(store.revert_to_previous().unwrap().is_none());

        let first = store.add_artifact("a", "a").unwrap();
        assert!(store.revert_to_previous().unwrap().is_none());

        let second = store.add_artifact("b", "b").unwrap();
        store.add_artifact("c", "c").unwrap();

        assert_eq!(store.revert_to_previous().unwrap().unwrap().id, second);
        assert_eq!(store.revert_to_previous().unwrap().unwrap().id, first);
        assert!(store.revert_to_previous().unwrap().is_none());
        assert_eq!(store.current_artifact_id(), Some(first));
        assert_eq!(store.artifacts().len(), 3);
    }

    #[test]
    fn add_message_keeps_order_and_pointer() {
        let (_, store) = memory_store();
        let artifact = store.add_artifact("a", "a").unwrap();

        let m1 = store.add_message(Role::User, "make a button").unwrap();
        let m2 = store.add_message(Role::Assistant, "<button/>").unwrap();
        assert_ne!(m1, m2);

        let conversation = store.conversation();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0].id, m1);
        assert_eq!(conversation[0].role, Role::User);
        assert_eq!(conversation[1].content, "<button/>");
        assert_eq!(store.current_artifact_id(), Some(artifact));
        assert_eq!(
            store.conversation_history(),
            vec![
                ChatMessage::user("make a button"),
                ChatMessage::assistant("<button/>")
            ]
        );
    }

    #[test]
    fn clear_conversation_keeps_artifacts() {
        let (storage, store) = memory_store();
        let first = store.add_artifact("a", "a").unwrap();
        store.add_artifact("b", "b").unwrap();
        store.set_current_artifact(&first).unwrap();
        store.add_message(Role::User, "hello").unwrap();

        let artifacts_before = store.artifacts();
        store.clear_conversation().unwrap();

        assert!(store.conversation().is_empty());
        assert_eq!(store.artifacts(), artifacts_before);
        assert_eq!(store.current_artifact_id(), Some(first));
        assert!(saved_state(&storage).conversation.is_empty());
    }

    #[test]
    fn reopening_restores_the_saved_state() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Store::open(storage.clone());
        store.set_credential("sk").unwrap();
        let first = store.add_artifact("a", "first").unwrap();
        store.add_artifact("b", "second").unwrap();
        store.add_message(Role::User, "second").unwrap();
        store.set_current_artifact(&first).unwrap();
        let expected = store.snapshot();
        drop(store);

        let reopened = Store::open(storage);
        assert_eq!(reopened.snapshot(), expected);
    }

    #[test]
    fn malformed_saved_state_falls_back_to_default() {
        let storage =
            Arc::new(MemoryStorage::new().with_entry(DEFAULT_STORAGE_KEY, "{not json"));
        let store = Store::open(storage.clone());

        assert_eq!(store.snapshot(), ApplicationState::default());

        store.add_message(Role::User, "hi").unwrap();
        assert_eq!(saved_state(&storage).conversation.len(), 1);
    }

    #[test]
    fn dangling_saved_pointer_is_cleared() {
        let storage = Arc::new(MemoryStorage::new().with_entry(
            DEFAULT_STORAGE_KEY,
            r#"{
                "apiKey": "sk",
                "artifacts": [
                    {"id": "a", "sourceText": "<p/>", "prompt": "p", "createdAt": 1}
                ],
                "currentArtifactId": "gone",
                "conversation": []
            }"#,
        ));
        let store = Store::open(storage);

        assert!(store.current_artifact_id().is_none());
        assert!(store.current_artifact().is_none());
        assert_eq!(store.artifacts().len(), 1);
        assert_eq!(store.credential(), "sk");
    }

    #[test]
    fn record_generation_writes_artifact_and_turns_together() {
        let (storage, store) = memory_store();

        let artifact = store.record_generation("<button/>", "a button").unwrap();

        let saved = saved_state(&storage);
        assert_eq!(saved, store.snapshot());
        assert_eq!(saved.artifacts, vec![artifact.clone()]);
        assert_eq!(saved.current_artifact_id, Some(artifact.id));
        let roles: Vec<Role> = saved.conversation.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(saved.conversation[0].content, "a button");
        assert_eq!(saved.conversation[1].content, "<button/>");
    }

    #[test]
    fn custom_key_is_used_for_reads_and_writes() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Store::open_with_key(storage.clone(), "other");
        store.set_credential("sk").unwrap();

        assert_eq!(store.storage_key(), "other");
        assert!(storage.get("other").is_some());
        assert!(storage.get(DEFAULT_STORAGE_KEY).is_none());
    }

    struct FlakyStorage {
        inner: MemoryStorage,
        fail: AtomicBool,
    }

    impl SnapshotStorage for FlakyStorage {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk unavailable"),
                });
            }
            self.inner.load(key)
        }

        fn save(&self, key: &str, contents: &str) -> Result<(), StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.save(key, contents)
        }
    }

    #[test]
    fn failed_write_leaves_state_unchanged() {
        let storage = Arc::new(FlakyStorage {
            inner: MemoryStorage::new(),
            fail: AtomicBool::new(false),
        });
        let store = Store::open(storage.clone());
        let id = store.add_artifact("a", "a").unwrap();

        storage.fail.store(true, Ordering::SeqCst);
        let error = store.add_artifact("b", "b").unwrap_err();

        assert!(matches!(error, StoreError::Persist(_)));
        assert_eq!(store.artifacts().len(), 1);
        assert_eq!(store.current_artifact_id(), Some(id));
    }

    #[test]
    fn unreadable_storage_opens_empty() {
        let storage = Arc::new(FlakyStorage {
            inner: MemoryStorage::new(),
            fail: AtomicBool::new(true),
        });

        let store = Store::open(storage);
        assert_eq!(store.snapshot(), ApplicationState::default());
    }
}
