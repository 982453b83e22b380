//! Gemini `generateContent` client with SSE streaming.

mod client;
mod streaming;
mod types;

pub use client::{DEFAULT_MODEL, GeminiChat, GeminiClient, GeminiSessionFactory};
