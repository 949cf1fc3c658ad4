//! Conversation state for the talk view
//!
//! A conversation is an append-only ordered sequence; messages are never
//! mutated after creation. Nothing is persisted — the history is gone when
//! the view ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assistant message appended when a text chat turn fails
pub const CHAT_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

/// Assistant message appended when a voice chat turn fails
pub const VOICE_CHAT_FALLBACK: &str =
    "Sorry, I couldn't process your voice message. Please try again.";

/// Shown in place of an empty transcript for a voice message
pub const VOICE_MESSAGE_PLACEHOLDER: &str = "Voice message";

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human
    User,
    /// The doppelganger
    Ai,
}

/// One entry in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Locally-assigned identifier
    pub id: Uuid,

    /// Message author
    pub role: Role,

    /// Message text
    pub text: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,

    /// Resolved audio URL of the spoken reply, for AI messages that have one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Append-only message sequence for one chat session
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Start an empty conversation
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Messages in append order
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing has been said yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a user message
    pub fn push_user(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.push(Role::User, text.into(), None)
    }

    /// Append an AI message, optionally carrying reply audio
    pub fn push_ai(&mut self, text: impl Into<String>, audio_url: Option<String>) -> &ChatMessage {
        self.push(Role::Ai, text.into(), audio_url)
    }

    fn push(&mut self, role: Role, text: String, audio_url: Option<String>) -> &ChatMessage {
        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            role,
            text,
            timestamp: Utc::now(),
            audio_url,
        });
        self.messages
            .last()
            .unwrap_or_else(|| unreachable!("just pushed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_append_order() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello");
        conversation.push_ai("hi there", Some("http://localhost:8000/audio/1.mp3".to_string()));
        conversation.push_user("how are you?");

        let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Ai, Role::User]);
        assert_eq!(conversation.messages()[1].text, "hi there");
    }

    #[test]
    fn message_ids_are_unique() {
        let mut conversation = Conversation::new();
        conversation.push_user("a");
        conversation.push_user("a");

        let ids = conversation.messages();
        assert_ne!(ids[0].id, ids[1].id);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Role::Ai).unwrap(), r#""ai""#);
    }

    #[test]
    fn user_messages_carry_no_audio() {
        let mut conversation = Conversation::new();
        let msg = conversation.push_user("hello");
        assert_eq!(msg.audio_url, None);
    }
}
