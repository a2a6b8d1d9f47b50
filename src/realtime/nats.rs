use super::memory::MemoryStore;
use super::record::{ChatRecord, NewRecord};
use super::store::{RealtimeStore, RecordStream};
use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Message store that shares chat rooms across processes over NATS
///
/// Records are published as JSON on `chats.<scheme>.<user>.messages`. NATS core
/// has no replay, so history covers the records this process has seen since it
/// started watching the room.
pub struct NatsStore {
    client: Client,
    mirror: Arc<MemoryStore>,
    watchers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl NatsStore {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            mirror: Arc::new(MemoryStore::new()),
            watchers: Mutex::new(HashMap::new()),
        })
    }

    /// NATS subject for a room id like `chats/pmKisan/user_1`
    pub fn subject(room_id: &str) -> String {
        let tokens: Vec<String> = room_id
            .split('/')
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.chars()
                    .map(|c| match c {
                        '.' | '*' | '>' | ' ' => '_',
                        c => c,
                    })
                    .collect()
            })
            .collect();
        format!("{}.messages", tokens.join("."))
    }

    /// Start mirroring a room's subject into the local log, once per room
    async fn watch(&self, room_id: &str) -> Result<()> {
        let mut watchers = self.watchers.lock().await;
        if watchers.contains_key(room_id) {
            return Ok(());
        }

        let subject = Self::subject(room_id);
        info!("Subscribing to {}", subject);

        let mut subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe to chat room")?;

        let mirror = Arc::clone(&self.mirror);
        let room = room_id.to_string();

        let task = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<ChatRecord>(&msg.payload) {
                    Ok(record) => {
                        mirror.insert(&room, record).await;
                    }
                    Err(e) => {
                        warn!("Failed to parse chat record on {}: {}", subject, e);
                    }
                }
            }

            info!("Chat room subscription {} closed", subject);
        });

        watchers.insert(room_id.to_string(), task);

        Ok(())
    }
}

#[async_trait::async_trait]
impl RealtimeStore for NatsStore {
    async fn append(&self, room_id: &str, record: NewRecord) -> Result<ChatRecord> {
        self.watch(room_id).await?;

        let record = ChatRecord::from_new(record);
        let subject = Self::subject(room_id);
        let payload = serde_json::to_vec(&record)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish chat record")?;

        info!("Published record {} to {}", record.id, subject);

        // Our own subscription echoes it back too; insert dedupes by id
        self.mirror.insert(room_id, record.clone()).await;

        Ok(record)
    }

    async fn subscribe(&self, room_id: &str) -> Result<RecordStream> {
        self.watch(room_id).await?;
        self.mirror.subscribe(room_id).await
    }

    async fn history(&self, room_id: &str) -> Result<Vec<ChatRecord>> {
        self.watch(room_id).await?;
        self.mirror.history(room_id).await
    }

    fn name(&self) -> &str {
        "nats"
    }
}

impl Drop for NatsStore {
    fn drop(&mut self) {
        if let Ok(watchers) = self.watchers.try_lock() {
            for task in watchers.values() {
                task.abort();
            }
        }
    }
}
