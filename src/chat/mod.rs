//! Chat completion clients for the scheme assistant
//!
//! Each request is stateless: the caller supplies the rolling history and
//! only the most recent turns are forwarded.

mod gemini;
mod message;
mod openai;
mod prompt;

pub use gemini::GeminiChat;
pub use message::{ChatCompletion, ChatMessage, ChatRequest};
pub use openai::{OpenAiChat, EMPTY_REPLY};
pub use prompt::{companion_instructions, system_prompt};

use crate::config::{ChatProvider, Config};
use std::sync::Arc;

/// Reply shown to the user when the assistant could not answer
pub const RETRY_PROMPT: &str =
    "Sorry, I encountered an error. Please try again or check your API key configuration.";

/// Build the configured chat provider
pub fn client_from_config(config: &Config) -> Arc<dyn ChatCompletion> {
    match config.chat.provider {
        ChatProvider::OpenAi => Arc::new(OpenAiChat::new(&config.openai, config.chat.history_limit)),
        ChatProvider::Gemini => Arc::new(GeminiChat::new(&config.gemini, config.chat.history_limit)),
    }
}
