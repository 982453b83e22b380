//! Chat message and session record types for Creo.
//!
//! These types model a conversation with the remote model: individual
//! messages (mutable only while streaming) and durable session records
//! holding a full transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Author of a message in a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Model => write!(f, "model"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "model" => Ok(MessageRole::Model),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message within a transcript.
///
/// The text is mutable only while `is_streaming` is true; once a message
/// is finalized it never changes. Ids are UUIDv7, so they are unique and
/// time-ordered within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub text: String,
    #[serde(default)]
    pub is_streaming: bool,
}

impl Message {
    /// Create a finalized user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role: MessageRole::User,
            text: text.into(),
            is_streaming: false,
        }
    }

    /// Create a finalized model message.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role: MessageRole::Model,
            text: text.into(),
            is_streaming: false,
        }
    }

    /// Create an empty model message awaiting streamed content.
    pub fn streaming_placeholder() -> Self {
        Self {
            id: Uuid::now_v7(),
            role: MessageRole::Model,
            text: String::new(),
            is_streaming: true,
        }
    }
}

/// A durable record of one chat session.
///
/// Records are stored most-recently-used first. A record holding only the
/// welcome message is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}
