//! services/api/src/adapters/realtime.rs
//!
//! An in-process realtime record store. Documents are JSON values addressed by
//! path; every change is published to subscribers so joined players can follow
//! a game live. Each connected client gets its own `ClientRecordStore` handle,
//! which implements the `RecordStore` port and owns that client's
//! disconnect-triggered cleanups.

use async_trait::async_trait;
use sage_core::ports::{PortResult, RecordStore};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 256;

/// A change published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    Changed { path: String, document: Value },
    Removed { path: String },
}

impl RecordEvent {
    pub fn path(&self) -> &str {
        match self {
            RecordEvent::Changed { path, .. } | RecordEvent::Removed { path } => path,
        }
    }
}

//=========================================================================================
// The Shared Store
//=========================================================================================

pub struct RealtimeStore {
    docs: RwLock<HashMap<String, Value>>,
    disconnect_triggers: Mutex<HashMap<Uuid, HashSet<String>>>,
    events: broadcast::Sender<RecordEvent>,
}

impl Default for RealtimeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            docs: RwLock::new(HashMap::new()),
            disconnect_triggers: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Hands out a handle for one connected client.
    pub fn client(self: &Arc<Self>) -> ClientRecordStore {
        ClientRecordStore {
            client_id: Uuid::new_v4(),
            store: Arc::clone(self),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.events.subscribe()
    }

    pub async fn read(&self, path: &str) -> Option<Value> {
        self.docs.read().await.get(path).cloned()
    }

    async fn write(&self, path: &str, document: Value) {
        self.docs
            .write()
            .await
            .insert(path.to_string(), document.clone());
        self.publish(RecordEvent::Changed {
            path: path.to_string(),
            document,
        });
    }

    async fn merge(&self, path: &str, fields: Map<String, Value>) {
        let document = {
            let mut docs = self.docs.write().await;
            let entry = docs
                .entry(path.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match &mut *entry {
                Value::Object(existing) => existing.extend(fields),
                other => *other = Value::Object(fields),
            }
            entry.clone()
        };
        self.publish(RecordEvent::Changed {
            path: path.to_string(),
            document,
        });
    }

    async fn delete(&self, path: &str) {
        let existed = self.docs.write().await.remove(path).is_some();
        if existed {
            self.publish(RecordEvent::Removed {
                path: path.to_string(),
            });
        }
    }

    async fn register_disconnect(&self, client_id: Uuid, path: &str) {
        self.disconnect_triggers
            .lock()
            .await
            .entry(client_id)
            .or_default()
            .insert(path.to_string());
    }

    /// Fires every cleanup the client registered, then forgets the client.
    pub async fn disconnect(&self, client_id: Uuid) {
        let paths = self
            .disconnect_triggers
            .lock()
            .await
            .remove(&client_id)
            .unwrap_or_default();
        for path in paths {
            info!("Client {} disconnected, removing {}", client_id, path);
            self.delete(&path).await;
        }
    }

    fn publish(&self, event: RecordEvent) {
        // No subscribers is the normal case for solo play.
        if self.events.send(event).is_err() {
            debug!("No subscribers for record event.");
        }
    }
}

//=========================================================================================
// Per-Client Handle (`RecordStore` Trait Implementation)
//=========================================================================================

#[derive(Clone)]
pub struct ClientRecordStore {
    client_id: Uuid,
    store: Arc<RealtimeStore>,
}

impl ClientRecordStore {
    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    /// Runs this client's disconnect triggers.
    pub async fn disconnect(&self) {
        self.store.disconnect(self.client_id).await;
    }
}

#[async_trait]
impl RecordStore for ClientRecordStore {
    async fn get(&self, path: &str) -> PortResult<Option<Value>> {
        Ok(self.store.read(path).await)
    }

    async fn set(&self, path: &str, document: Value) -> PortResult<()> {
        self.store.write(path, document).await;
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> PortResult<()> {
        self.store.merge(path, fields).await;
        Ok(())
    }

    async fn remove(&self, path: &str) -> PortResult<()> {
        self.store.delete(path).await;
        Ok(())
    }

    async fn on_disconnect_remove(&self, path: &str) -> PortResult<()> {
        self.store.register_disconnect(self.client_id, path).await;
        Ok(())
    }
}
