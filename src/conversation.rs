//! Conversation history for one interactive session.
//!
//! The store is an ordinary owned value: readers borrow it, and only the
//! session that owns it appends turns.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        };
        f.write_str(name)
    }
}

/// A role-tagged message as sent to the text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

/// A recorded turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.text.clone())
    }
}

#[derive(Debug, Clone)]
pub struct ConversationStore {
    greeting: ChatTurn,
    turns: Vec<ChatTurn>,
}

impl ConversationStore {
    /// Starts a conversation with a single assistant greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: ChatTurn::new(Role::Assistant, greeting),
            turns: Vec::new(),
        }
    }

    pub fn greeting(&self) -> &ChatTurn {
        &self.greeting
    }

    /// Turns after the greeting, in the order they happened.
    pub fn exchanges(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Everything a UI would show: the greeting followed by the exchanges.
    pub fn display_turns(&self) -> impl Iterator<Item = &ChatTurn> {
        std::iter::once(&self.greeting).chain(self.turns.iter())
    }

    pub fn last(&self) -> &ChatTurn {
        self.turns.last().unwrap_or(&self.greeting)
    }

    pub(crate) fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn::new(Role::User, text));
    }

    pub(crate) fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn::new(Role::Assistant, text));
    }

    /// Drops every exchange and keeps the greeting.
    pub(crate) fn reset(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_holds_only_greeting() {
        let store = ConversationStore::new("Hi there");
        assert!(store.exchanges().is_empty());
        assert_eq!(store.display_turns().count(), 1);
        assert_eq!(store.last().text, "Hi there");
        assert_eq!(store.greeting().role, Role::Assistant);
    }

    #[test]
    fn test_display_turns_include_greeting_first() {
        let mut store = ConversationStore::new("Hi there");
        store.push_user("What is the current ratio?");
        store.push_assistant("It is 1.50.");

        let roles: Vec<Role> = store.display_turns().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(store.exchanges().len(), 2);
    }

    #[test]
    fn test_reset_keeps_greeting() {
        let mut store = ConversationStore::new("Hi there");
        store.push_user("A");
        store.reset();
        assert!(store.exchanges().is_empty());
        assert_eq!(store.last().text, "Hi there");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let message = ChatMessage::user("A");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"user","text":"A"}"#);
    }
}
