//! The set of currently joined connections.

use crate::connection::Connection;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stable identifier for a registered connection.
///
/// Handles are minted from a monotonic counter, so comparing two handles
/// compares their join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionHandle(u64);

impl ConnectionHandle {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Point-in-time view of registry membership, in join order.
pub type Snapshot = Vec<(ConnectionHandle, Arc<Connection>)>;

/// Thread-safe membership table.
///
/// The lock only ever guards the map itself. Callers that need to write to
/// members take a [`snapshot`](Registry::snapshot) and do their I/O after the
/// lock is released.
#[derive(Debug, Default)]
pub struct Registry {
    connections: RwLock<BTreeMap<ConnectionHandle, Arc<Connection>>>,
    next_handle: AtomicU64,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return its handle.
    pub fn add(&self, conn: Arc<Connection>) -> ConnectionHandle {
        let handle = ConnectionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        self.connections.write().insert(handle, conn);
        handle
    }

    /// Register a connection unless `max` are already registered.
    ///
    /// The count and the insert happen under one write lock, so concurrent
    /// callers cannot overshoot the limit.
    pub fn try_add(&self, conn: Arc<Connection>, max: usize) -> Option<ConnectionHandle> {
        let mut connections = self.connections.write();
        if connections.len() >= max {
            return None;
        }
        let handle = ConnectionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        connections.insert(handle, conn);
        Some(handle)
    }

    /// Remove a connection. Removing an absent handle is a no-op.
    pub fn remove(&self, handle: ConnectionHandle) -> Option<Arc<Connection>> {
        self.connections.write().remove(&handle)
    }

    /// Look up a registered connection.
    pub fn get(&self, handle: ConnectionHandle) -> Option<Arc<Connection>> {
        self.connections.read().get(&handle).cloned()
    }

    /// Check whether a handle is currently registered.
    pub fn contains(&self, handle: ConnectionHandle) -> bool {
        self.connections.read().contains_key(&handle)
    }

    /// Copy the current membership.
    pub fn snapshot(&self) -> Snapshot {
        self.connections
            .read()
            .iter()
            .map(|(handle, conn)| (*handle, conn.clone()))
            .collect()
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }
}
