//! HTTP API for the mobile client
//!
//! This module provides a REST API backing the app screens:
//! - GET /health - Health check
//! - POST /api/chat - Ask the scheme assistant
//! - POST /api/realtime/session - Mint a realtime voice session
//! - GET|POST /api/rooms/:scheme/:user/messages - Read or append a chat room
//! - GET /api/translations/:language - UI string table

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
