//! GeminiClient -- concrete exchange implementation for the Gemini API.
//!
//! A [`GeminiClient`] holds the HTTP client and credentials; a
//! [`GeminiChat`] is one multi-turn conversation (the exchange the core
//! talks to), holding its history client-side the way the upstream SDK's
//! chat object does. [`GeminiSessionFactory`] binds a client to a system
//! instruction so the core can mint fresh, optionally history-seeded
//! exchanges.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use secrecy::SecretString;

use creo_core::chat::exchange::{ChatExchange, ExchangeFactory};
use creo_core::prompts::{COACH_INSTRUCTION, STRATEGIST_INSTRUCTION};
use creo_types::chat::{Message, MessageRole};
use creo_types::error::ExchangeError;

use super::streaming::create_gemini_stream;
use super::types::{Content, GenerateContentRequest, GenerationConfig};

/// Default model for both assistants.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Sampling temperature used by both assistants.
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Arc<SecretString>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for `model`.
    pub fn new(api_key: impl Into<Arc<SecretString>>, model: String) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model,
        }
    }

    /// The model this client targets.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    /// Start a multi-turn conversation, optionally seeded with a prior
    /// transcript.
    pub fn chat(
        &self,
        system_instruction: &str,
        temperature: f64,
        history: &[Message],
    ) -> GeminiChat {
        let seeded: Vec<Content> = history
            .iter()
            .map(|m| match m.role {
                MessageRole::User => Content::user(m.text.clone()),
                MessageRole::Model => Content::model(m.text.clone()),
            })
            .collect();

        GeminiChat {
            client: self.client.clone(),
            api_key: Arc::clone(&self.api_key),
            url: self.stream_url(),
            system_instruction: system_instruction.to_string(),
            temperature,
            history: Arc::new(Mutex::new(seeded)),
        }
    }
}

// GeminiClient intentionally does NOT derive Debug so the credential-holding
// struct never reaches log output.

/// One open conversation against the Gemini API.
///
/// History lives on this side of the boundary: each send posts the full
/// history plus the new user turn, and a naturally completed response
/// appends both turns for the next call. A transport failure leaves the
/// history untouched, so a retry re-sends the same context.
pub struct GeminiChat {
    client: reqwest::Client,
    api_key: Arc<SecretString>,
    url: String,
    system_instruction: String,
    temperature: f64,
    history: Arc<Mutex<Vec<Content>>>,
}

impl GeminiChat {
    /// Number of turns currently in the conversation history.
    pub fn history_len(&self) -> usize {
        self.history.lock().expect("gemini history poisoned").len()
    }
}

impl ChatExchange for GeminiChat {
    fn send_message_stream(
        &self,
        text: &str,
    ) -> Pin<Box<dyn Stream<Item = Result<String, ExchangeError>> + Send + 'static>> {
        let user_turn = Content::user(text);
        let contents = {
            let history = self.history.lock().expect("gemini history poisoned");
            let mut contents = history.clone();
            contents.push(user_turn.clone());
            contents
        };

        let body = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::system(self.system_instruction.clone())),
            generation_config: Some(GenerationConfig {
                temperature: Some(self.temperature),
            }),
        };

        let inner = create_gemini_stream(&self.client, &self.url, body, Arc::clone(&self.api_key));
        let history = Arc::clone(&self.history);

        Box::pin(async_stream::try_stream! {
            let mut inner = inner;
            let mut accumulator = String::new();
            while let Some(fragment) = inner.next().await {
                let fragment = fragment?;
                accumulator.push_str(&fragment);
                yield fragment;
            }
            // Natural completion: commit the exchange to the history.
            let mut history = history.lock().expect("gemini history poisoned");
            history.push(user_turn);
            history.push(Content::model(accumulator));
        })
    }
}

/// Mints [`GeminiChat`] exchanges for one assistant persona.
pub struct GeminiSessionFactory {
    client: GeminiClient,
    system_instruction: String,
    temperature: f64,
}

impl GeminiSessionFactory {
    pub fn new(client: GeminiClient, system_instruction: impl Into<String>) -> Self {
        Self {
            client,
            system_instruction: system_instruction.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Factory for the content strategist assistant.
    pub fn strategist(client: GeminiClient) -> Self {
        Self::new(client, STRATEGIST_INSTRUCTION)
    }

    /// Factory for the goal coach assistant.
    pub fn coach(client: GeminiClient) -> Self {
        Self::new(client, COACH_INSTRUCTION)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

impl ExchangeFactory for GeminiSessionFactory {
    type Exchange = GeminiChat;

    fn create(&self, history: &[Message]) -> GeminiChat {
        self.client
            .chat(&self.system_instruction, self.temperature, history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> GeminiClient {
        GeminiClient::new(
            SecretString::from("test-key-not-real"),
            DEFAULT_MODEL.to_string(),
        )
    }

    #[test]
    fn test_stream_url() {
        let client = make_client();
        assert_eq!(
            client.stream_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_base_url_override() {
        let client = make_client().with_base_url("http://localhost:8080".to_string());
        assert!(client.stream_url().starts_with("http://localhost:8080/"));
    }

    #[test]
    fn test_chat_seeds_history() {
        let client = make_client();
        let history = vec![Message::user("hi"), Message::model("hello")];
        let chat = client.chat("sys", 0.7, &history);
        assert_eq!(chat.history_len(), 2);
    }

    #[test]
    fn test_factory_creates_fresh_exchange() {
        let factory = GeminiSessionFactory::strategist(make_client());
        let chat = factory.create(&[]);
        assert_eq!(chat.history_len(), 0);
        assert_eq!(chat.system_instruction, STRATEGIST_INSTRUCTION);
        assert_eq!(chat.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_coach_factory_uses_coach_instruction() {
        let factory = GeminiSessionFactory::coach(make_client()).with_temperature(0.4);
        let chat = factory.create(&[]);
        assert_eq!(chat.system_instruction, COACH_INSTRUCTION);
        assert_eq!(chat.temperature, 0.4);
    }
}
