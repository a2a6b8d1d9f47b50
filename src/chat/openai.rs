use super::message::{ChatCompletion, ChatRequest};
use super::prompt::system_prompt;
use crate::cloud;
use crate::config::OpenAiConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Reply used when the API answers without any content
pub const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI chat completions client
pub struct OpenAiChat {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    history_limit: usize,
}

impl OpenAiChat {
    pub fn new(config: &OpenAiConfig, history_limit: usize) -> Self {
        Self {
            http: cloud::http_client(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.credential().map(str::to_string),
            model: config.chat_model.clone(),
            history_limit,
        }
    }
}

#[async_trait::async_trait]
impl ChatCompletion for OpenAiChat {
    async fn send_message(&self, request: &ChatRequest) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("OpenAI API key is not configured. Please set openai.api_key in the config");
        };

        let prompt = system_prompt(request.scheme, request.mode, request.language);

        let mut messages = vec![WireMessage {
            role: "system",
            content: &prompt,
        }];
        messages.extend(
            request
                .recent_history(self.history_limit)
                .iter()
                .map(|m| WireMessage {
                    role: if m.is_user { "user" } else { "assistant" },
                    content: &m.text,
                }),
        );
        messages.push(WireMessage {
            role: "user",
            content: &request.text,
        });

        debug!("Sending {} messages to {}", messages.len(), self.model);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                temperature: 0.7,
                max_tokens: 500,
            })
            .send()
            .await
            .context("Failed to reach OpenAI")?;

        if !response.status().is_success() {
            let message = cloud::error_message(response, "API Error").await;
            error!("Chat API error: {}", message);
            bail!(message);
        }

        let body: CompletionResponse = response
            .json()
            .await
            .context("Invalid chat completion response")?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
