use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::errors::HubError;
use super::registry::{ConnectionId, ConnectionState, JoinResult, Registry};
use crate::websockets::ChatMessage;

/// Outbox size used when nothing else is configured
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

/// Hub tuning knobs
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Per-connection buffer; a full outbox is treated as a failed write
    pub outbox_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

/// Snapshot of registry size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStats {
    pub connections: usize,
    pub rooms: usize,
}

/// Outcome of one dispatch pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub evicted: Vec<ConnectionId>,
}

/// Shared handle to the registry and the inbound queue
///
/// Cloned into every session. The registry sits behind one exclusive lock
/// that registration, join/leave, eviction and the dispatch pass all take,
/// so a pass never sees a half-applied membership change.
#[derive(Clone)]
pub struct Hub {
    registry: Arc<Mutex<Registry>>,
    queue: mpsc::UnboundedSender<ChatMessage>,
    config: HubConfig,
}

impl Hub {
    /// Creates the hub and the dispatcher that must be started to drain its queue
    pub fn new(config: HubConfig) -> (Self, HubDispatcher) {
        let registry = Arc::new(Mutex::new(Registry::new()));
        let (queue, receiver) = mpsc::unbounded_channel();

        let hub = Self {
            registry: registry.clone(),
            queue,
            config,
        };
        let dispatcher = HubDispatcher { registry, receiver };

        (hub, dispatcher)
    }

    /// Registers a new connection with no rooms and returns the receiving end
    /// of its outbox
    pub async fn register(&self) -> (ConnectionId, mpsc::Receiver<String>) {
        let (outbox, receiver) = mpsc::channel(self.config.outbox_capacity.max(1));
        let id = self.registry.lock().await.register(outbox);

        debug!(connection_id = %id, "Connection registered");
        (id, receiver)
    }

    /// Registers a connection already joined to `room_id` in one step, so no
    /// dispatch pass sees it half set up. An empty room id leaves it roomless.
    pub async fn connect(&self, room_id: &str) -> (ConnectionId, mpsc::Receiver<String>) {
        let (outbox, receiver) = mpsc::channel(self.config.outbox_capacity.max(1));

        let mut registry = self.registry.lock().await;
        let id = registry.register(outbox);
        let joined = registry.join(id, room_id);
        drop(registry);

        debug!(
            connection_id = %id,
            room_id = %room_id,
            result = ?joined,
            "Connection registered"
        );
        (id, receiver)
    }

    pub async fn join(&self, id: ConnectionId, room_id: &str) -> Result<JoinResult, HubError> {
        let result = self.registry.lock().await.join(id, room_id)?;

        debug!(
            connection_id = %id,
            room_id = %room_id,
            result = ?result,
            "Join processed"
        );
        Ok(result)
    }

    pub async fn leave(&self, id: ConnectionId, room_id: &str) -> Result<bool, HubError> {
        let removed = self.registry.lock().await.leave(id, room_id)?;

        debug!(
            connection_id = %id,
            room_id = %room_id,
            removed = removed,
            "Leave processed"
        );
        Ok(removed)
    }

    /// Removes the connection and all its memberships. Returns false if it
    /// was already gone (e.g. evicted by the dispatcher first).
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        match self.registry.lock().await.remove(id) {
            Some(rooms) => {
                debug!(
                    connection_id = %id,
                    rooms = rooms.len(),
                    "Connection removed from registry"
                );
                true
            }
            None => false,
        }
    }

    /// Appends a message to the dispatch queue without waiting
    pub fn enqueue(&self, message: ChatMessage) -> Result<(), HubError> {
        self.queue.send(message).map_err(|_| HubError::Stopped)
    }

    pub async fn state_of(&self, id: ConnectionId) -> ConnectionState {
        self.registry.lock().await.state_of(id)
    }

    pub async fn rooms_of(&self, id: ConnectionId) -> Vec<String> {
        let registry = self.registry.lock().await;
        let mut rooms: Vec<String> = registry
            .rooms_of(id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    pub async fn stats(&self) -> HubStats {
        let registry = self.registry.lock().await;
        HubStats {
            connections: registry.connection_count(),
            rooms: registry.room_count(),
        }
    }
}

/// Single consumer of the hub's queue
pub struct HubDispatcher {
    registry: Arc<Mutex<Registry>>,
    receiver: mpsc::UnboundedReceiver<ChatMessage>,
}

impl HubDispatcher {
    /// Spawns the dispatch loop as a background task
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drains the queue in FIFO order until every `Hub` handle is dropped
    pub async fn run(mut self) {
        info!("Hub dispatcher started");

        while let Some(message) = self.receiver.recv().await {
            let report = self.dispatch(&message).await;

            debug!(
                room_id = %message.room_id,
                delivered = report.delivered,
                evicted = report.evicted.len(),
                "Dispatch pass complete"
            );
        }

        warn!("Hub dispatcher stopped - all hub handles dropped");
    }

    /// One dispatch pass: deliver `message` to every connection currently in
    /// its room, evicting any connection whose outbox rejects it.
    ///
    /// Writes are `try_send` into bounded outboxes, so the registry lock is
    /// never held across socket I/O.
    pub async fn dispatch(&self, message: &ChatMessage) -> DispatchReport {
        let mut report = DispatchReport::default();

        if message.room_id.is_empty() {
            debug!("Dropping message without a room");
            return report;
        }

        let frame = match message.encode() {
            Ok(frame) => frame,
            Err(e) => {
                error!(
                    room_id = %message.room_id,
                    error = %e,
                    "Failed to encode message, skipping"
                );
                return report;
            }
        };

        let mut registry = self.registry.lock().await;

        for (id, outbox) in registry.members_of(&message.room_id) {
            match outbox.try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        connection_id = %id,
                        room_id = %message.room_id,
                        error = %e,
                        "Delivery failed, evicting connection"
                    );
                    report.evicted.push(id);
                }
            }
        }

        for id in &report.evicted {
            registry.remove(*id);
        }

        if report.delivered == 0 && report.evicted.is_empty() {
            debug!(room_id = %message.room_id, "No members in room, message dropped");
        }

        report
    }
}
