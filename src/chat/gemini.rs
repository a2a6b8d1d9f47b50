use super::message::{ChatCompletion, ChatRequest};
use super::prompt::system_prompt;
use crate::cloud;
use crate::config::GeminiConfig;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Instruction<'a>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Instruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Google Gemini `generateContent` client
pub struct GeminiChat {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    history_limit: usize,
}

impl GeminiChat {
    pub fn new(config: &GeminiConfig, history_limit: usize) -> Self {
        Self {
            http: cloud::http_client(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.credential().map(str::to_string),
            model: config.model.clone(),
            history_limit,
        }
    }
}

#[async_trait::async_trait]
impl ChatCompletion for GeminiChat {
    async fn send_message(&self, request: &ChatRequest) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("Gemini API key is not configured. Please set gemini.api_key in the config");
        };

        let instruction = system_prompt(request.scheme, request.mode, request.language);

        let mut contents: Vec<Content> = request
            .recent_history(self.history_limit)
            .iter()
            .map(|m| Content {
                role: if m.is_user { "user" } else { "model" },
                parts: [Part { text: &m.text }],
            })
            .collect();
        contents.push(Content {
            role: "user",
            parts: [Part {
                text: &request.text,
            }],
        });

        debug!("Sending {} turns to {}", contents.len(), self.model);

        let response = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", api_key)])
            .json(&GenerateRequest {
                contents,
                system_instruction: Instruction {
                    parts: [Part { text: &instruction }],
                },
                generation_config: GenerationConfig {
                    temperature: 0.7,
                    top_k: 40,
                    top_p: 0.95,
                    max_output_tokens: 1024,
                },
            })
            .send()
            .await
            .context("Failed to reach Gemini")?;

        if !response.status().is_success() {
            let message = cloud::error_message(response, "Gemini API Error").await;
            error!("Gemini API error: {}", message);
            bail!(message);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Invalid Gemini response")?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("No response generated from Gemini API"))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
