//! Durable session store.
//!
//! Keeps the ordered list of saved session records (most recently upserted
//! first) and mirrors every mutation to the storage backend before
//! returning. Malformed persisted JSON fails open to an empty store.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use creo_types::chat::{Message, SessionRecord};
use creo_types::error::StorageError;

use crate::chat::title::derive_title;
use crate::storage::StorageBackend;

/// Storage key for the chat session history.
pub const CHAT_HISTORY_KEY: &str = "creo-chat-history";

/// Build a session record from a finalized transcript.
///
/// Mints a time-ordered id when the session has none yet and derives the
/// list title from the first user message.
pub fn record_from_transcript(id: Option<Uuid>, messages: Vec<Message>) -> SessionRecord {
    SessionRecord {
        id: id.unwrap_or_else(Uuid::now_v7),
        title: derive_title(&messages),
        messages,
        created_at: Utc::now(),
    }
}

/// Durable mapping from session id to transcript, recency-ordered.
pub struct SessionStore<S: StorageBackend> {
    backend: S,
    records: Vec<SessionRecord>,
}

impl<S: StorageBackend> SessionStore<S> {
    /// Load the store from the backend.
    ///
    /// A missing key yields an empty store. Malformed JSON also yields an
    /// empty store (logged, never fatal) so a corrupt payload can't block
    /// startup.
    pub async fn load(backend: S) -> Result<Self, StorageError> {
        let records = match backend.get(CHAT_HISTORY_KEY).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "malformed chat history payload, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(Self { backend, records })
    }

    /// Insert or replace a record by id and move it to the front.
    ///
    /// A record holding at most one message (only a welcome line) is never
    /// persisted; the call is a no-op that still returns the record's id.
    /// Otherwise the store is flushed before returning.
    pub async fn upsert(&mut self, record: SessionRecord) -> Result<Uuid, StorageError> {
        let id = record.id;
        if record.messages.len() <= 1 {
            debug!(session_id = %id, "skipping persist of welcome-only session");
            return Ok(id);
        }

        self.records.retain(|r| r.id != id);
        self.records.insert(0, record);
        self.flush().await?;
        Ok(id)
    }

    /// All records, most recently upserted first.
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    /// Records whose title contains `filter`, case-insensitively.
    /// An empty filter returns everything.
    pub fn list(&self, filter: &str) -> Vec<&SessionRecord> {
        let needle = filter.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Look up a record by id.
    pub fn get(&self, id: Uuid) -> Option<&SessionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Remove a record by id. Returns whether anything was removed.
    pub async fn remove(&mut self, id: Uuid) -> Result<bool, StorageError> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.flush().await?;
        }
        Ok(removed)
    }

    /// Drop every record and remove the key from the backend.
    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        self.backend.remove(CHAT_HISTORY_KEY).await
    }

    async fn flush(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.backend.set(CHAT_HISTORY_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use creo_types::chat::Message;

    fn record(title_source: &str) -> SessionRecord {
        record_from_transcript(
            None,
            vec![
                Message::model("welcome"),
                Message::user(title_source),
                Message::model("reply"),
            ],
        )
    }

    #[tokio::test]
    async fn test_upsert_then_list_roundtrips_content() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::load(storage.clone()).await.unwrap();

        let rec = record("caption ideas");
        let id = store.upsert(rec.clone()).await.unwrap();

        let listed = store.list("");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].messages, rec.messages);

        // Reloading from the same backend reproduces the same sequence.
        let reloaded = SessionStore::load(storage).await.unwrap();
        assert_eq!(reloaded.records(), store.records());
    }

    #[tokio::test]
    async fn test_upsert_moves_record_to_front() {
        let mut store = SessionStore::load(MemoryStorage::new()).await.unwrap();
        let first = record("first");
        let second = record("second");
        let first_id = store.upsert(first.clone()).await.unwrap();
        store.upsert(second).await.unwrap();
        assert_eq!(store.records()[0].title, "second");

        // Re-upserting the first record moves it back to the front.
        store.upsert(first).await.unwrap();
        assert_eq!(store.records()[0].id, first_id);
        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn test_welcome_only_record_never_persisted() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::load(storage.clone()).await.unwrap();

        let rec = record_from_transcript(None, vec![Message::model("welcome")]);
        store.upsert(rec).await.unwrap();

        assert!(store.list("").is_empty());
        assert!(storage.get(CHAT_HISTORY_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_case_insensitively() {
        let mut store = SessionStore::load(MemoryStorage::new()).await.unwrap();
        store.upsert(record("Reel Hooks")).await.unwrap();
        store.upsert(record("posting schedule")).await.unwrap();

        assert_eq!(store.list("HOOKS").len(), 1);
        assert_eq!(store.list("hooks")[0].title, "Reel Hooks");
        assert_eq!(store.list("").len(), 2);
        assert!(store.list("nothing").is_empty());
    }

    #[tokio::test]
    async fn test_remove() {
        let mut store = SessionStore::load(MemoryStorage::new()).await.unwrap();
        let id = store.upsert(record("to delete")).await.unwrap();

        assert!(store.remove(id).await.unwrap());
        assert!(store.list("").is_empty());
        assert!(!store.remove(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_removes_backend_key() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::load(storage.clone()).await.unwrap();
        store.upsert(record("one")).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.records().is_empty());
        assert!(storage.get(CHAT_HISTORY_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_payload_fails_open() {
        let storage = MemoryStorage::new();
        storage.set(CHAT_HISTORY_KEY, "{not json").await.unwrap();

        let store = SessionStore::load(storage).await.unwrap();
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_record_from_transcript_mints_id_once() {
        let messages = vec![Message::model("w"), Message::user("hi")];
        let rec = record_from_transcript(None, messages.clone());
        let again = record_from_transcript(Some(rec.id), messages);
        assert_eq!(rec.id, again.id);
        assert_eq!(rec.title, "hi");
    }
}
