use super::record::{ChatRecord, NewRecord};
use super::store::{RealtimeStore, RecordStream};
use anyhow::{bail, Result};
use futures::stream::{self, StreamExt};
use tracing::warn;

/// Store used when no realtime backend is configured
///
/// Subscriptions are empty and history is always empty; appends fail.
#[derive(Debug, Default)]
pub struct DisabledStore;

#[async_trait::async_trait]
impl RealtimeStore for DisabledStore {
    async fn append(&self, _room_id: &str, _record: NewRecord) -> Result<ChatRecord> {
        bail!("Realtime chat is not configured. Set realtime.backend in the config")
    }

    async fn subscribe(&self, room_id: &str) -> Result<RecordStream> {
        warn!("Realtime chat is not configured; {} will not receive updates", room_id);
        Ok(stream::empty().boxed())
    }

    async fn history(&self, _room_id: &str) -> Result<Vec<ChatRecord>> {
        Ok(Vec::new())
    }

    fn is_configured(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
