// Integration tests for the HTTP API
//
// Requests are driven straight through the router with `tower::ServiceExt`.

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use formfriend::chat::{ChatCompletion, ChatRequest, RETRY_PROMPT};
use formfriend::realtime::{DisabledStore, MemoryStore, RealtimeStore};
use formfriend::{create_router, AppState, Config, Language, Scheme};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Chat provider that echoes the request context, or fails on demand
#[derive(Default)]
struct EchoChat {
    fail: bool,
    seen: Mutex<Vec<ChatRequest>>,
}

#[async_trait::async_trait]
impl ChatCompletion for EchoChat {
    async fn send_message(&self, request: &ChatRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        if self.fail {
            anyhow::bail!("upstream unavailable");
        }
        Ok(format!("{}|{}|{}", request.scheme.key(), request.mode.as_str(), request.language))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

fn router_with(chat: Arc<EchoChat>, store: Arc<dyn RealtimeStore>, config: Config) -> Router {
    create_router(AppState::new(config, chat, store))
}

fn router() -> Router {
    router_with(
        Arc::new(EchoChat::default()),
        Arc::new(MemoryStore::new()),
        Config::default(),
    )
}

async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let (status, body) = send(&router(), get("/health")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "FormFriend Backend");

    Ok(())
}

#[tokio::test]
async fn test_chat_resolves_context() -> Result<()> {
    let chat = Arc::new(EchoChat::default());
    let router = router_with(chat.clone(), Arc::new(MemoryStore::new()), Config::default());

    let (status, body) = send(
        &router,
        post_json(
            "/api/chat",
            json!({
                "message": "  How do I apply?  ",
                "scheme": "pmUjjwala",
                "mode": "offline",
                "language": "telugu",
                "history": [{ "text": "hi", "is_user": true }]
            }),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "pmUjjwala|offline|telugu");

    let seen = chat.seen.lock().unwrap();
    assert_eq!(seen[0].text, "How do I apply?");
    assert_eq!(seen[0].history.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_chat_defaults_for_missing_context() -> Result<()> {
    let (status, body) = send(
        &router(),
        post_json("/api/chat", json!({ "message": "hello", "scheme": "unknown" })),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "others|online|english");

    Ok(())
}

#[tokio::test]
async fn test_chat_rejects_blank_message() -> Result<()> {
    let (status, _) = send(&router(), post_json("/api/chat", json!({ "message": "   " }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_chat_failure_returns_retry_prompt() -> Result<()> {
    let chat = Arc::new(EchoChat {
        fail: true,
        ..EchoChat::default()
    });
    let router = router_with(chat, Arc::new(MemoryStore::new()), Config::default());

    let (status, body) = send(&router, post_json("/api/chat", json!({ "message": "hello" }))).await?;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], RETRY_PROMPT);

    Ok(())
}

#[tokio::test]
async fn test_room_append_and_history() -> Result<()> {
    let router = router();
    let uri = "/api/rooms/pmKisan/user_9/messages";

    let (status, created) = send(&router, post_json(uri, json!({ "text": "Is eKYC required?" }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["text"], "Is eKYC required?");
    assert_eq!(created["is_user"], true);
    assert!(created["id"].is_string());

    let (status, _) = send(
        &router,
        post_json(uri, json!({ "text": "Yes, eKYC is mandatory.", "is_user": false, "user_id": "agent" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, history) = send(&router, get(uri)).await?;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().expect("array");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["text"], "Is eKYC required?");
    assert_eq!(history[1]["user_id"], "agent");

    let (_, other) = send(&router, get("/api/rooms/pmKisan/user_10/messages")).await?;
    assert_eq!(other, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_room_rejects_blank_message() -> Result<()> {
    let (status, _) = send(
        &router(),
        post_json("/api/rooms/nfsa/u/messages", json!({ "text": " " })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_room_append_without_backend() -> Result<()> {
    let router = router_with(Arc::new(EchoChat::default()), Arc::new(DisabledStore), Config::default());

    let (status, _) = send(
        &router,
        post_json("/api/rooms/nfsa/u/messages", json!({ "text": "hello" })),
    )
    .await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, history) = send(&router, get("/api/rooms/nfsa/u/messages")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_translations() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("gujarati.json"),
        r#"{ "welcome": "ફોર્મફ્રેન્ડમાં આપનું સ્વાગત છે" }"#,
    )?;

    let mut config = Config::default();
    config.service.locales_dir = dir.path().display().to_string();
    let router = router_with(Arc::new(EchoChat::default()), Arc::new(MemoryStore::new()), config);

    let (status, body) = send(&router, get("/api/translations/gujarati")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["welcome"], "ફોર્મફ્રેન્ડમાં આપનું સ્વાગત છે");
    assert_eq!(body["send"], "Send");
    assert_eq!(body["chatWithAI"], "Chat with AI");

    let (status, body) = send(&router, get("/api/translations/klingon")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["welcome"], "Welcome to FormFriend");
    assert_eq!(
        body["options"][Scheme::PmMudra.key()],
        "Pradhan Mantri Mudra Yojana"
    );
    assert_eq!(Language::resolve("klingon"), Language::English);

    Ok(())
}

#[tokio::test]
async fn test_realtime_session_requires_key() -> Result<()> {
    let (status, body) = send(&router(), post_json("/api/realtime/session", json!({}))).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("OpenAI API key is not configured"));

    Ok(())
}

#[tokio::test]
async fn test_realtime_session_forwards_token() -> Result<()> {
    use axum::routing::post;

    let upstream = Router::new().route(
        "/realtime/sessions",
        post(|axum::Json(body): axum::Json<Value>| async move {
            axum::Json(json!({
                "id": "sess_123",
                "model": body["model"],
                "client_secret": { "value": "ek_abc" }
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });

    let mut config = Config::default();
    config.openai.api_key = Some("sk-test".to_string());
    config.openai.base_url = format!("http://{}", addr);
    let router = router_with(Arc::new(EchoChat::default()), Arc::new(MemoryStore::new()), config);

    let (status, body) = send(&router, post_json("/api/realtime/session", json!({}))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["session"]["client_secret"]["value"], "ek_abc");
    assert_eq!(body["session"]["model"], "gpt-4o-mini-realtime-preview");

    Ok(())
}
