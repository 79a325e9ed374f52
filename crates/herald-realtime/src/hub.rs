//! Broadcast hub coordinating join, leave, unicast and fan-out.

use crate::connection::Connection;
use crate::error::RealtimeError;
use crate::event::ChatMessage;
use crate::registry::{ConnectionHandle, Registry};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of the observer channel.
const BROADCAST_CAPACITY: usize = 1024;

/// Hub settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Refuse joins beyond this many live connections. `None` means unbounded.
    pub max_connections: Option<usize>,
}

/// The hub owns the registry of live connections and delivers messages to them.
///
/// Per-recipient failures are logged and counted, never returned: one dead
/// client must not fail the caller. The hub also never removes a connection
/// because a write failed; removal belongs to the session that owns it.
#[derive(Debug)]
pub struct Hub {
    registry: Registry,
    config: HubConfig,
    /// Every broadcast text, for in-process observers.
    event_tx: broadcast::Sender<String>,
    stats: RwLock<HubStats>,
}

impl Hub {
    /// Create a hub.
    pub fn new(config: HubConfig) -> Self {
        let (event_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            registry: Registry::new(),
            config,
            event_tx,
            stats: RwLock::new(HubStats::default()),
        }
    }

    /// Register a connection, then announce it to every member, itself included.
    pub fn join(&self, conn: Connection) -> Result<ConnectionHandle, RealtimeError> {
        let client_id = conn.client_id;
        let handle = match self.config.max_connections {
            Some(max) => match self.registry.try_add(Arc::new(conn), max) {
                Some(handle) => handle,
                None => {
                    warn!(client_id, max, "Connection limit reached");
                    return Err(RealtimeError::CapacityReached(max));
                }
            },
            None => self.registry.add(Arc::new(conn)),
        };
        self.stats.write().total_joins += 1;

        info!(client_id, handle = %handle, "Client joined");

        self.broadcast(ChatMessage::Joined { client_id }.to_string());
        Ok(handle)
    }

    /// Deregister a connection and announce the departure to those remaining.
    ///
    /// Returns false, and announces nothing, if the handle was not registered.
    pub fn leave(&self, handle: ConnectionHandle) -> bool {
        let Some(conn) = self.registry.remove(handle) else {
            debug!(handle = %handle, "Leave for unknown handle ignored");
            return false;
        };

        let client_id = conn.client_id;
        self.stats.write().total_leaves += 1;
        info!(client_id, handle = %handle, "Client left");

        self.broadcast(ChatMessage::Left { client_id }.to_string());
        true
    }

    /// Deliver a message to one connection. Returns whether it was queued.
    pub fn send(&self, handle: ConnectionHandle, message: impl Into<String>) -> bool {
        let Some(conn) = self.registry.get(handle) else {
            debug!(handle = %handle, "Send to unknown handle ignored");
            return false;
        };

        match conn.send(message.into()) {
            Ok(()) => true,
            Err(e) => {
                self.stats.write().failed_deliveries += 1;
                warn!(client_id = conn.client_id, handle = %handle, error = %e, "Send failed");
                false
            }
        }
    }

    /// Deliver a message to every current member.
    ///
    /// Membership is copied before any delivery is attempted. Returns the
    /// number of connections the message was queued for.
    pub fn broadcast(&self, message: impl Into<String>) -> usize {
        let message = message.into();
        let snapshot = self.registry.snapshot();

        let mut delivered = 0;
        let mut failed = 0;
        for (handle, conn) in &snapshot {
            match conn.send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    warn!(
                        client_id = conn.client_id,
                        handle = %handle,
                        error = %e,
                        "Broadcast delivery failed"
                    );
                }
            }
        }

        {
            let mut stats = self.stats.write();
            stats.total_broadcasts += 1;
            stats.failed_deliveries += failed;
        }

        // No observers is fine
        let _ = self.event_tx.send(message);

        debug!(
            members = snapshot.len(),
            recipients = delivered,
            failed,
            "Broadcast"
        );

        delivered
    }

    /// Subscribe to the text of every broadcast.
    pub fn subscribe_events(&self) -> broadcast::Receiver<String> {
        self.event_tx.subscribe()
    }

    /// Check whether a handle is currently joined.
    pub fn contains(&self, handle: ConnectionHandle) -> bool {
        self.registry.contains(handle)
    }

    /// Get current connection count.
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Get hub statistics.
    pub fn stats(&self) -> HubStats {
        let mut stats = self.stats.read().clone();
        stats.current_connections = self.connection_count();
        stats
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

/// Hub statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStats {
    /// Current number of connections.
    pub current_connections: usize,
    /// Joins since start.
    pub total_joins: u64,
    /// Leaves since start.
    pub total_leaves: u64,
    /// Broadcasts since start, announcements included.
    pub total_broadcasts: u64,
    /// Per-recipient deliveries that failed.
    pub failed_deliveries: u64,
}
