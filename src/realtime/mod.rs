//! Realtime chat rooms
//!
//! Conversations are kept in append-only per-room logs. Subscribers first
//! receive the existing log, then every record appended afterwards.
//!
//! - `MemoryStore`: single-process rooms
//! - `NatsStore`: rooms shared over NATS pub/sub
//! - `DisabledStore`: no backend configured; reads are empty, appends fail

mod disabled;
mod memory;
mod nats;
mod record;
mod store;

pub use disabled::DisabledStore;
pub use memory::MemoryStore;
pub use nats::NatsStore;
pub use record::{anonymous_user_id, room_id, ChatRecord, NewRecord};
pub use store::{RealtimeStore, RecordStream};

use crate::config::{RealtimeBackend, RealtimeConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

/// Build the configured store; an unreachable NATS server degrades to disabled
pub async fn store_from_config(config: &RealtimeConfig) -> Result<Arc<dyn RealtimeStore>> {
    let store: Arc<dyn RealtimeStore> = match config.backend {
        RealtimeBackend::Memory => Arc::new(MemoryStore::new()),
        RealtimeBackend::Nats => match NatsStore::connect(&config.nats_url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("Realtime chat unavailable ({}); continuing without it", e);
                Arc::new(DisabledStore)
            }
        },
        RealtimeBackend::Disabled => Arc::new(DisabledStore),
    };

    Ok(store)
}
