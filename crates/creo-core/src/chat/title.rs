//! Session title derivation.
//!
//! Titles come from the first user message, truncated for list display.
//! No model call involved.

use creo_types::chat::{Message, MessageRole};

/// Maximum title length before truncation, in characters.
pub const TITLE_MAX_CHARS: usize = 30;

/// Title used when a transcript has no user message yet.
pub const FALLBACK_TITLE: &str = "New Strategy";

/// Derive a list title from a transcript.
///
/// Uses the first user message, truncated to [`TITLE_MAX_CHARS`] characters
/// plus an ellipsis. Truncation counts characters, not bytes, so multi-byte
/// text is never split mid-character.
pub fn derive_title(messages: &[Message]) -> String {
    let Some(first_user) = messages.iter().find(|m| m.role == MessageRole::User) else {
        return FALLBACK_TITLE.to_string();
    };

    let text = &first_user.text;
    match text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_used_verbatim() {
        let messages = vec![Message::model("welcome"), Message::user("Caption ideas?")];
        assert_eq!(derive_title(&messages), "Caption ideas?");
    }

    #[test]
    fn test_long_message_truncated_with_ellipsis() {
        let long = "Give me a full content calendar for the next three months";
        let messages = vec![Message::model("welcome"), Message::user(long)];
        let title = derive_title(&messages);
        assert_eq!(title, format!("{}...", &long[..30]));
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn test_exactly_thirty_chars_not_truncated() {
        let text: String = "a".repeat(30);
        let messages = vec![Message::user(text.clone())];
        assert_eq!(derive_title(&messages), text);
    }

    #[test]
    fn test_multibyte_truncation_counts_chars() {
        let text: String = "é".repeat(40);
        let messages = vec![Message::user(text)];
        let title = derive_title(&messages);
        assert_eq!(title.chars().count(), 33);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_no_user_message_falls_back() {
        let messages = vec![Message::model("welcome")];
        assert_eq!(derive_title(&messages), FALLBACK_TITLE);
    }

    #[test]
    fn test_skips_model_messages() {
        let messages = vec![
            Message::model("welcome"),
            Message::model("stray"),
            Message::user("hooks"),
        ];
        assert_eq!(derive_title(&messages), "hooks");
    }
}
