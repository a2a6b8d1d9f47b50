use crate::locale::{ApplicationMode, Language, Scheme};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
        }
    }
}

/// A user message plus the context the assistant needs to answer it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    pub scheme: Scheme,
    #[serde(default)]
    pub mode: ApplicationMode,
    #[serde(default)]
    pub language: Language,
    /// Earlier turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

impl ChatRequest {
    /// The last `limit` history entries
    pub fn recent_history(&self, limit: usize) -> &[ChatMessage] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }
}

/// Stateless chat completion service
#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Produce the assistant's reply to `request`
    async fn send_message(&self, request: &ChatRequest) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
