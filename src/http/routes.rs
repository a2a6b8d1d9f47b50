use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Assistant
        .route("/api/chat", post(handlers::send_chat))
        .route(
            "/api/realtime/session",
            post(handlers::create_realtime_session),
        )
        // Chat rooms
        .route(
            "/api/rooms/:scheme/:user/messages",
            get(handlers::get_room_history).post(handlers::append_room_message),
        )
        // Localization
        .route(
            "/api/translations/:language",
            get(handlers::get_translations),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
