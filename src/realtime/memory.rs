use super::record::{ChatRecord, NewRecord};
use super::store::{sort_by_time, RealtimeStore, RecordStream};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

/// Capacity of each room's fan-out channel
const ROOM_CHANNEL_CAPACITY: usize = 256;

struct Room {
    log: Vec<ChatRecord>,
    updates: broadcast::Sender<ChatRecord>,
}

impl Room {
    fn new() -> Self {
        let (updates, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            log: Vec::new(),
            updates,
        }
    }
}

/// In-process message store
#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<String, Room>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message produced elsewhere (e.g. received over the network)
    pub(crate) async fn insert(&self, room_id: &str, record: ChatRecord) -> bool {
        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id.to_string()).or_insert_with(Room::new);

        if room.log.iter().any(|r| r.id == record.id) {
            return false;
        }

        room.log.push(record.clone());
        // No receivers just means nobody is subscribed
        let _ = room.updates.send(record);
        true
    }
}

#[async_trait::async_trait]
impl RealtimeStore for MemoryStore {
    async fn append(&self, room_id: &str, record: NewRecord) -> Result<ChatRecord> {
        let record = ChatRecord::from_new(record);
        self.insert(room_id, record.clone()).await;
        debug!("Appended record {} to {}", record.id, room_id);
        Ok(record)
    }

    async fn subscribe(&self, room_id: &str) -> Result<RecordStream> {
        // Snapshot and subscribe under one lock so no record is missed or repeated
        let (replay, updates) = {
            let mut rooms = self.rooms.write().await;
            let room = rooms.entry(room_id.to_string()).or_insert_with(Room::new);
            (room.log.clone(), room.updates.subscribe())
        };

        let room = room_id.to_string();
        let live = stream::unfold((updates, room), |(mut updates, room)| async move {
            loop {
                match updates.recv().await {
                    Ok(record) => return Some((record, (updates, room))),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Subscriber to {} lagged, skipped {} records", room, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(stream::iter(replay).chain(live).boxed())
    }

    async fn history(&self, room_id: &str) -> Result<Vec<ChatRecord>> {
        let rooms = self.rooms.read().await;
        let mut records = rooms
            .get(room_id)
            .map(|room| room.log.clone())
            .unwrap_or_default();
        sort_by_time(&mut records);
        Ok(records)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
