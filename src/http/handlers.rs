use super::state::AppState;
use crate::chat::{companion_instructions, ChatMessage, ChatRequest, RETRY_PROMPT};
use crate::locale::{ApplicationMode, Language, Scheme, UiStrings};
use crate::realtime::{room_id, ChatRecord, NewRecord};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatApiRequest {
    /// The user's message
    pub message: String,

    /// Scheme key (e.g. "pmKisan"); unknown keys mean "others"
    #[serde(default)]
    pub scheme: Option<String>,

    /// "online" or "offline"
    #[serde(default)]
    pub mode: Option<String>,

    /// Application language identifier (e.g. "hindi")
    #[serde(default)]
    pub language: Option<String>,

    /// Previous turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatApiResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct RealtimeSessionResponse {
    pub success: bool,
    pub session: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            service: state.config.service.name.clone(),
        }),
    )
}

/// POST /api/chat
/// Ask the assistant about a scheme
pub async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatApiRequest>,
) -> impl IntoResponse {
    let text = req.message.trim();
    if text.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Message must not be empty");
    }

    let request = ChatRequest {
        text: text.to_string(),
        scheme: req.scheme.as_deref().map(Scheme::resolve).unwrap_or(Scheme::Others),
        mode: req.mode.as_deref().map(ApplicationMode::resolve).unwrap_or_default(),
        language: req.language.as_deref().map(Language::resolve).unwrap_or_default(),
        history: req.history,
    };

    info!(
        "Chat request via {} ({}, {}, {})",
        state.chat.name(),
        request.scheme.key(),
        request.mode.as_str(),
        request.language
    );

    match state.chat.send_message(&request).await {
        Ok(reply) => (StatusCode::OK, Json(ChatApiResponse { reply })).into_response(),
        Err(e) => {
            error!("Chat completion failed: {:#}", e);
            error_response(StatusCode::BAD_GATEWAY, RETRY_PROMPT)
        }
    }
}

/// GET /api/rooms/:scheme/:user/messages
/// Get a chat room's messages ordered by time
pub async fn get_room_history(
    State(state): State<AppState>,
    Path((scheme, user)): Path<(String, String)>,
) -> impl IntoResponse {
    let room = room_id(Scheme::resolve(&scheme), Some(&user));

    match state.store.history(&room).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            error!("Failed to read {}: {:#}", room, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to read chat history: {}", e))
        }
    }
}

/// POST /api/rooms/:scheme/:user/messages
/// Append a message to a chat room
pub async fn append_room_message(
    State(state): State<AppState>,
    Path((scheme, user)): Path<(String, String)>,
    Json(record): Json<NewRecord>,
) -> impl IntoResponse {
    if record.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Message must not be empty");
    }

    let room = room_id(Scheme::resolve(&scheme), Some(&user));

    if !state.store.is_configured() {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Realtime chat is not configured",
        );
    }

    match state.store.append(&room, record).await {
        Ok(record) => (StatusCode::CREATED, Json::<ChatRecord>(record)).into_response(),
        Err(e) => {
            error!("Failed to append to {}: {:#}", room, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to send message: {}", e))
        }
    }
}

/// GET /api/translations/:language
/// UI strings for a language (English when unknown)
pub async fn get_translations(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> impl IntoResponse {
    let language = Language::resolve(&language);

    match UiStrings::load(&state.locales_dir, language) {
        Ok(strings) => (StatusCode::OK, Json(strings)).into_response(),
        Err(e) => {
            error!("Failed to load {} strings: {:#}", language, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to load translations: {}", e))
        }
    }
}

/// POST /api/realtime/session
/// Create an OpenAI realtime voice session (returns an ephemeral token)
pub async fn create_realtime_session(State(state): State<AppState>) -> impl IntoResponse {
    let openai = &state.config.openai;

    let Some(api_key) = openai.credential() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "OpenAI API key is not configured. Please set openai.api_key in the config.",
        );
    };

    let response = state
        .http
        .post(format!("{}/realtime/sessions", openai.base_url.trim_end_matches('/')))
        .bearer_auth(api_key)
        .json(&serde_json::json!({
            "model": openai.realtime_model,
            "instructions": companion_instructions(),
            "output_modalities": ["audio"],
        }))
        .send()
        .await;

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to reach OpenAI: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();

    if !status.is_success() {
        let message = body["error"]["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("OpenAI API Error: {}", status));
        error!("Realtime session request failed: {}", message);
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return error_response(status, message);
    }

    info!("Realtime voice session created");

    (
        StatusCode::OK,
        Json(RealtimeSessionResponse {
            success: true,
            session: body,
        }),
    )
        .into_response()
}
