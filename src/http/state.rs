use crate::chat::ChatCompletion;
use crate::config::Config;
use crate::realtime::{MemoryStore, RealtimeStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Chat completion provider
    pub chat: Arc<dyn ChatCompletion>,

    /// Realtime chat rooms
    pub store: Arc<dyn RealtimeStore>,

    /// Directory holding `<language>.json` string tables
    pub locales_dir: PathBuf,

    /// Client for minting realtime voice sessions
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, chat: Arc<dyn ChatCompletion>, store: Arc<dyn RealtimeStore>) -> Self {
        let locales_dir = PathBuf::from(&config.service.locales_dir);
        Self {
            config: Arc::new(config),
            chat,
            store,
            locales_dir,
            http: crate::cloud::http_client(),
        }
    }

    /// State with the configured chat provider and an in-memory store
    pub fn from_config(config: Config) -> Self {
        let chat = crate::chat::client_from_config(&config);
        Self::new(config, chat, Arc::new(MemoryStore::new()))
    }
}
