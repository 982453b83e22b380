//! Chat session service.
//!
//! Coordinates the transcript controller and the session store: persists
//! finalized transcripts, binds fresh transcripts to their minted session
//! ids, and keeps the active transcript consistent with store deletions.

use tracing::info;
use uuid::Uuid;

use creo_types::chat::{Message, SessionRecord};
use creo_types::error::ChatError;

use crate::chat::exchange::ExchangeFactory;
use crate::chat::store::{SessionStore, record_from_transcript};
use crate::chat::transcript::{SubmitOutcome, TranscriptController};
use crate::prompts::WELCOME_MESSAGE;
use crate::storage::StorageBackend;

/// One feature's session controller: active transcript + durable history.
pub struct ChatSessionService<F: ExchangeFactory, S: StorageBackend> {
    controller: TranscriptController<F>,
    store: SessionStore<S>,
}

impl<F: ExchangeFactory, S: StorageBackend> ChatSessionService<F, S> {
    /// Create a service with the canonical strategist welcome.
    pub fn new(factory: F, store: SessionStore<S>) -> Self {
        Self::with_welcome(factory, store, WELCOME_MESSAGE)
    }

    /// Create a service with a custom welcome line.
    pub fn with_welcome(factory: F, store: SessionStore<S>, welcome: &str) -> Self {
        Self {
            controller: TranscriptController::new(factory, welcome),
            store,
        }
    }

    /// The active transcript.
    pub fn transcript(&self) -> Vec<Message> {
        self.controller.transcript()
    }

    /// Id of the active saved session, if it has been persisted.
    pub fn active_session(&self) -> Option<Uuid> {
        self.controller.active_session()
    }

    /// Saved sessions whose title matches `filter` (empty matches all).
    pub fn list(&self, filter: &str) -> Vec<&SessionRecord> {
        self.store.list(filter)
    }

    /// Submit a message; on completion the finalized transcript is
    /// persisted and the session id bound.
    pub async fn send(&mut self, text: &str) -> Result<SubmitOutcome, ChatError> {
        self.send_with(text, |_| {}).await
    }

    /// Submit with a streaming patch observer (see
    /// [`TranscriptController::submit_with`]).
    ///
    /// Transport failures leave the transcript carrying the failure notice
    /// and persist nothing.
    pub async fn send_with<P>(&mut self, text: &str, on_patch: P) -> Result<SubmitOutcome, ChatError>
    where
        P: FnMut(&str) + Send,
    {
        let outcome = self.controller.submit_with(text, on_patch).await?;

        if let SubmitOutcome::Completed(transcript) = &outcome {
            let record =
                record_from_transcript(self.controller.active_session(), transcript.clone());
            let id = self.store.upsert(record).await?;
            if self.controller.active_session().is_none() {
                self.controller.set_active_session(id);
            }
        }

        Ok(outcome)
    }

    /// Start a fresh session, saving the current one first when it holds
    /// more than the welcome message.
    pub async fn new_session(&mut self) -> Result<(), ChatError> {
        self.persist_current().await?;
        self.controller.reset();
        Ok(())
    }

    /// Switch to a saved session. Returns false when the id is unknown.
    ///
    /// The outgoing transcript is saved first (when it holds anything
    /// beyond the welcome), and the exchange is re-seeded with the loaded
    /// transcript.
    pub async fn open_session(&mut self, id: Uuid) -> Result<bool, ChatError> {
        if self.controller.active_session() == Some(id) {
            return Ok(true);
        }
        let Some(record) = self.store.get(id).cloned() else {
            return Ok(false);
        };

        self.persist_current().await?;
        self.controller.load(&record);
        Ok(true)
    }

    /// Delete a saved session. Deleting the active one cascades: the
    /// transcript resets to a fresh, unsaved welcome state.
    pub async fn delete_session(&mut self, id: Uuid) -> Result<bool, ChatError> {
        let removed = self.store.remove(id).await?;
        if self.controller.active_session() == Some(id) {
            self.controller.reset();
            info!(session_id = %id, "active session deleted, transcript reset");
        }
        Ok(removed)
    }

    /// Delete every saved session and reset the active transcript.
    pub async fn clear_history(&mut self) -> Result<(), ChatError> {
        self.store.clear().await?;
        self.controller.reset();
        Ok(())
    }

    async fn persist_current(&mut self) -> Result<(), ChatError> {
        let transcript = self.controller.transcript();
        if transcript.len() > 1 {
            let record =
                record_from_transcript(self.controller.active_session(), transcript);
            self.store.upsert(record).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    use futures_util::Stream;

    use creo_types::chat::MessageRole;
    use creo_types::error::ExchangeError;

    use crate::chat::exchange::ChatExchange;
    use crate::storage::MemoryStorage;

    struct EchoExchange;

    impl ChatExchange for EchoExchange {
        fn send_message_stream(
            &self,
            text: &str,
        ) -> Pin<Box<dyn Stream<Item = Result<String, ExchangeError>> + Send + 'static>> {
            let reply = format!("echo: {text}");
            Box::pin(futures_util::stream::iter(vec![Ok(reply)]))
        }
    }

    #[derive(Default)]
    struct EchoFactory {
        seeds: Arc<Mutex<Vec<Vec<Message>>>>,
    }

    impl ExchangeFactory for EchoFactory {
        type Exchange = EchoExchange;

        fn create(&self, history: &[Message]) -> EchoExchange {
            self.seeds.lock().unwrap().push(history.to_vec());
            EchoExchange
        }
    }

    async fn service_on(storage: MemoryStorage) -> ChatSessionService<EchoFactory, MemoryStorage> {
        let store = SessionStore::load(storage).await.unwrap();
        ChatSessionService::new(EchoFactory::default(), store)
    }

    #[tokio::test]
    async fn test_send_persists_and_binds_session_id() {
        let mut service = service_on(MemoryStorage::new()).await;
        assert!(service.active_session().is_none());

        service.send("caption ideas please").await.unwrap();

        let id = service.active_session().expect("session bound after save");
        let records = service.list("");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].title, "caption ideas please");
        assert_eq!(records[0].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_repeat_sends_reupsert_same_record() {
        let mut service = service_on(MemoryStorage::new()).await;
        service.send("first").await.unwrap();
        let id = service.active_session().unwrap();
        service.send("second").await.unwrap();

        let records = service.list("");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].messages.len(), 5);
    }

    #[tokio::test]
    async fn test_new_session_without_user_message_persists_nothing() {
        let mut service = service_on(MemoryStorage::new()).await;
        service.new_session().await.unwrap();
        service.new_session().await.unwrap();
        assert!(service.list("").is_empty());
    }

    #[tokio::test]
    async fn test_new_session_saves_current_first() {
        let mut service = service_on(MemoryStorage::new()).await;
        service.send("save me").await.unwrap();
        service.new_session().await.unwrap();

        assert!(service.active_session().is_none());
        assert_eq!(service.transcript().len(), 1);
        assert_eq!(service.list("").len(), 1);
    }

    #[tokio::test]
    async fn test_open_session_restores_transcript_and_seeds_exchange() {
        let seeds = Arc::new(Mutex::new(Vec::new()));
        let factory = EchoFactory {
            seeds: Arc::clone(&seeds),
        };
        let store = SessionStore::load(MemoryStorage::new()).await.unwrap();
        let mut service = ChatSessionService::new(factory, store);

        service.send("about reels").await.unwrap();
        let id = service.active_session().unwrap();
        service.new_session().await.unwrap();

        assert!(service.open_session(id).await.unwrap());
        assert_eq!(service.active_session(), Some(id));
        assert_eq!(service.transcript().len(), 3);

        // The exchange seeded for the reopened session starts with the
        // user turn, not the welcome line.
        let seeds = seeds.lock().unwrap();
        let last_seed = seeds.last().unwrap();
        assert_eq!(last_seed[0].role, MessageRole::User);
        assert_eq!(last_seed[0].text, "about reels");
    }

    #[tokio::test]
    async fn test_open_unknown_session_is_noop() {
        let mut service = service_on(MemoryStorage::new()).await;
        assert!(!service.open_session(Uuid::now_v7()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_active_session_cascades_to_reset() {
        let mut service = service_on(MemoryStorage::new()).await;
        service.send("doomed").await.unwrap();
        let id = service.active_session().unwrap();

        assert!(service.delete_session(id).await.unwrap());
        assert!(service.active_session().is_none());
        let transcript = service.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].text, WELCOME_MESSAGE);
        assert!(service.list("").is_empty());
    }

    #[tokio::test]
    async fn test_delete_inactive_session_leaves_transcript_alone() {
        let mut service = service_on(MemoryStorage::new()).await;
        service.send("keep me").await.unwrap();
        let first = service.active_session().unwrap();
        service.new_session().await.unwrap();
        service.send("current").await.unwrap();

        assert!(service.delete_session(first).await.unwrap());
        assert_eq!(service.transcript().len(), 3);
        assert!(service.active_session().is_some());
    }

    #[tokio::test]
    async fn test_clear_history_resets_everything() {
        let mut service = service_on(MemoryStorage::new()).await;
        service.send("one").await.unwrap();
        service.new_session().await.unwrap();
        service.send("two").await.unwrap();

        service.clear_history().await.unwrap();
        assert!(service.list("").is_empty());
        assert!(service.active_session().is_none());
        assert_eq!(service.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_history_survives_reload() {
        let storage = MemoryStorage::new();
        {
            let mut service = service_on(storage.clone()).await;
            service.send("persist me").await.unwrap();
        }

        let service = service_on(storage).await;
        let records = service.list("");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "persist me");
    }
}
