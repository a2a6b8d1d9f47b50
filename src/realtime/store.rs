use super::record::{ChatRecord, NewRecord};
use anyhow::Result;
use futures::stream::BoxStream;

/// Stream of records for one room; dropping it unsubscribes
pub type RecordStream = BoxStream<'static, ChatRecord>;

/// Append-only per-room message log with live subscription
#[async_trait::async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Append a record to the room's log and notify subscribers
    async fn append(&self, room_id: &str, record: NewRecord) -> Result<ChatRecord>;

    /// Existing records (oldest first) followed by every record appended later
    async fn subscribe(&self, room_id: &str) -> Result<RecordStream>;

    /// All records in the room, ordered by timestamp
    async fn history(&self, room_id: &str) -> Result<Vec<ChatRecord>>;

    /// Whether the store is backed by a real service
    fn is_configured(&self) -> bool {
        true
    }

    /// Store name for logging
    fn name(&self) -> &str;
}

/// Sort by timestamp, keeping append order for equal timestamps
pub(crate) fn sort_by_time(records: &mut [ChatRecord]) {
    records.sort_by_key(|r| r.timestamp);
}
