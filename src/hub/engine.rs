//! Hub engine
//!
//! The hub owns everything mutable in the service:
//! - the topic registry and the table of latest readings
//! - one expiry timer slot per point
//! - the set of connected WebSocket clients
//!
//! Concurrency and usage notes:
//! - The API is synchronous and designed to be held behind a lock
//!   (`SharedHub`). MQTT ingestion, expiry fires and client handlers each
//!   take the lock for one call and never hold it across an `.await`, which
//!   serializes all state changes.
//! - Announcements never wait on a client. Each client has a bounded queue;
//!   a client whose queue is full or closed is dropped from the hub, which
//!   closes its socket once the forward task sees the sender gone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::client::{Client, ClientId};
use crate::hub::expiry::{Expired, ExpiryTimers};
use crate::ingest::payload::{IngestError, parse_value};
use crate::points::{
    PointSnapshot, PointTable, Reading, ReadingKind, TopicLayout, TopicRegistry,
};
use crate::transport::message::ServerMessage;

pub type SharedHub = Arc<Mutex<Hub>>;

/// Queue slots a client gets on top of one full replay.
const CLIENT_QUEUE_HEADROOM: usize = 64;

/// Locks the hub, recovering the guard if a previous holder panicked.
pub fn lock(hub: &SharedHub) -> MutexGuard<'_, Hub> {
    hub.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct Hub {
    registry: TopicRegistry,
    layout: TopicLayout,
    table: PointTable,
    expiry: ExpiryTimers,
    pub clients: HashMap<ClientId, Client>,
}

impl Hub {
    /// Creates a hub with every point absent. The returned receiver yields
    /// timer fires and must be driven by [`run_expiry_loop`].
    pub fn new(
        registry: TopicRegistry,
        layout: TopicLayout,
        expiry_window: Duration,
    ) -> (Self, UnboundedReceiver<Expired>) {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        let len = registry.len();
        let hub = Self {
            registry,
            layout,
            table: PointTable::new(len),
            expiry: ExpiryTimers::new(len, expiry_window, expired_tx),
            clients: HashMap::new(),
        };
        (hub, expired_rx)
    }

    /// Wraps the hub for sharing and spawns its expiry loop.
    pub fn spawn(
        registry: TopicRegistry,
        layout: TopicLayout,
        expiry_window: Duration,
    ) -> SharedHub {
        let (hub, expired_rx) = Self::new(registry, layout, expiry_window);
        let hub = Arc::new(Mutex::new(hub));
        tokio::spawn(run_expiry_loop(hub.clone(), expired_rx));
        hub
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    pub fn layout(&self) -> TopicLayout {
        self.layout
    }

    pub fn table(&self) -> &PointTable {
        &self.table
    }

    pub fn is_expiry_armed(&self, index: usize) -> bool {
        self.expiry.is_armed(index)
    }

    /// Outbound queue size for a new client: room for a full replay plus
    /// live updates arriving while it drains.
    pub fn client_queue_capacity(&self) -> usize {
        self.table.len() * self.layout.kinds().len() + CLIENT_QUEUE_HEADROOM
    }

    pub fn register_client(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    pub fn remove_client(&mut self, client_id: &ClientId) {
        self.clients.remove(client_id);
    }

    /// Handles one inbound MQTT message.
    ///
    /// On success the reading is stored, the point's expiry is re-armed and
    /// the new value is announced. On error nothing changes.
    pub fn ingest(&mut self, topic: &str, payload: &[u8]) -> Result<Reading, IngestError> {
        let (index, kind) = self
            .registry
            .route(self.layout, topic)
            .ok_or_else(|| IngestError::UnknownTopic(topic.to_string()))?;

        let value = parse_value(payload).map_err(|source| IngestError::InvalidPayload {
            topic: topic.to_string(),
            source,
        })?;

        let reading = Reading { index, kind, value };
        self.table.apply(reading);
        self.expiry.reset(index);
        self.announce(index, kind, Some(value));

        debug!("Point {} {} = {}", index, kind.suffix(), value);
        Ok(reading)
    }

    /// Handles a timer fire. Stale fires are ignored.
    ///
    /// Returns the number of clearing announcements made.
    pub fn expire(&mut self, expired: Expired) -> usize {
        if !self.expiry.settle(expired) {
            debug!("Ignoring stale expiry for point {}", expired.index);
            return 0;
        }

        let cleared = self.table.clear(expired.index);
        info!(
            "Point {} expired after {:?} without data",
            expired.index,
            self.expiry.window()
        );
        for kind in &cleared {
            self.announce(expired.index, *kind, None);
        }
        cleared.len()
    }

    /// Sends one update to every connected client. Clients that cannot take
    /// it are dropped. Returns how many accepted it.
    pub fn announce(&mut self, index: usize, kind: ReadingKind, value: Option<f64>) -> usize {
        let text = match serde_json::to_string(&ServerMessage::update(index, kind, value)) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize update: {e}");
                return 0;
            }
        };

        self.clients.retain(|id, client| {
            let sent = client.send_text(&text);
            if !sent {
                warn!("Dropping client {id}: outbound queue full or closed");
            }
            sent
        });
        self.clients.len()
    }

    /// Sends the full table to one client: one event per point per reading
    /// kind tracked by the layout. Returns the number of events sent.
    pub fn replay(&mut self, client_id: &ClientId) -> usize {
        let Some(client) = self.clients.get(client_id) else {
            warn!("Replay requested for unknown client {client_id}");
            return 0;
        };

        let mut sent = 0;
        for (index, point) in self.table.iter() {
            for kind in self.layout.kinds() {
                let msg = ServerMessage::update(index, *kind, point.get(*kind));
                let text = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to serialize replay: {e}");
                        continue;
                    }
                };
                if !client.send_text(&text) {
                    warn!("Dropping client {client_id}: replay did not fit its queue");
                    self.clients.remove(client_id);
                    return sent;
                }
                sent += 1;
            }
        }
        sent
    }

    pub fn snapshot(&self) -> Vec<PointSnapshot> {
        self.table
            .iter()
            .map(|(index, point)| PointSnapshot {
                index,
                topic: self.registry.topic(index).map(str::to_string),
                temperature: point.temperature,
                humidity: point.humidity,
                updated_at: point.updated_at,
            })
            .collect()
    }
}

/// Applies timer fires to the hub as they arrive.
pub async fn run_expiry_loop(hub: SharedHub, mut expired_rx: UnboundedReceiver<Expired>) {
    while let Some(expired) = expired_rx.recv().await {
        lock(&hub).expire(expired);
    }
}
