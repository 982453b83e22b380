//! Application state shared across command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use creo_core::chat::service::ChatSessionService;
use creo_core::chat::store::SessionStore;
use creo_core::goal::ledger::GoalLedger;
use creo_infra::llm::gemini::{DEFAULT_MODEL, GeminiClient, GeminiSessionFactory};
use creo_infra::storage::{JsonFileStorage, default_data_dir};

pub struct AppState {
    pub data_dir: PathBuf,
    model: String,
    api_key: Option<Arc<SecretString>>,
}

impl AppState {
    /// Build state from the environment.
    ///
    /// The API key is only required once a screen actually talks to the
    /// model, so offline goal commands work without one.
    pub fn init() -> anyhow::Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|key| Arc::new(SecretString::from(key)));
        let model = std::env::var("CREO_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            data_dir: default_data_dir(),
            model,
            api_key,
        })
    }

    /// A Gemini client, or an actionable error when no key is configured.
    pub fn gemini(&self) -> anyhow::Result<GeminiClient> {
        let api_key = self
            .api_key
            .as_ref()
            .context("GEMINI_API_KEY not set. Export it to talk to the assistants.")?;
        Ok(GeminiClient::new(Arc::clone(api_key), self.model.clone()))
    }

    pub fn storage(&self) -> anyhow::Result<JsonFileStorage> {
        JsonFileStorage::new(&self.data_dir)
            .map_err(|e| anyhow::anyhow!("failed to open data dir: {e}"))
    }

    /// The strategist's session controller over durable history.
    pub async fn chat_service(
        &self,
    ) -> anyhow::Result<ChatSessionService<GeminiSessionFactory, JsonFileStorage>> {
        let store = SessionStore::load(self.storage()?)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load chat history: {e}"))?;
        let factory = GeminiSessionFactory::strategist(self.gemini()?);
        Ok(ChatSessionService::new(factory, store))
    }

    /// The durable goal ledger.
    pub async fn goal_ledger(&self) -> anyhow::Result<GoalLedger<JsonFileStorage>> {
        GoalLedger::load(self.storage()?)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load goals: {e}"))
    }
}
