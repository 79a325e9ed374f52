//! Live client connections and the transport seam they ride on.
//!
//! A [`Connection`] is what the registry holds: the client identifier plus the
//! sending half of a bounded outbound queue. The session that owns the socket
//! keeps the matching [`Outbound`] and drains it into a [`MessageSink`], so a
//! hub write never touches the network directly.

use crate::error::{RecvError, SendError};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Client-supplied identifier. Not unique, only used in message text and logs.
pub type ClientId = i64;

/// Default capacity of a connection's outbound queue.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

/// A live connection as seen by the hub.
#[derive(Debug)]
pub struct Connection {
    /// Identifier taken from the connect path.
    pub client_id: ClientId,
    /// Unix timestamp (seconds) when the connection was created.
    pub connected_at: u64,
    sender: mpsc::Sender<String>,
}

impl Connection {
    /// Queue one text message for delivery.
    ///
    /// Never waits: a full queue is reported as [`SendError::Full`] and the
    /// message is dropped for this connection.
    pub fn send(&self, message: String) -> Result<(), SendError> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }

    /// Returns true once the draining side has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Receiving half of a connection's outbound queue.
pub type Outbound = mpsc::Receiver<String>;

/// Create a connection with an outbound queue of the given capacity.
pub fn connection(client_id: ClientId, capacity: usize) -> (Connection, Outbound) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let conn = Connection {
        client_id,
        connected_at: unix_now(),
        sender,
    };
    (conn, receiver)
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Write side of a bidirectional text transport.
#[async_trait]
pub trait MessageSink: Send {
    /// Write a single text frame.
    async fn send(&mut self, text: String) -> Result<(), SendError>;

    /// Close the transport. The default does nothing.
    async fn close(&mut self) {}
}

/// Read side of a bidirectional text transport.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next text frame.
    ///
    /// Non-text frames are the transport's business and must not surface here.
    async fn receive(&mut self) -> Result<String, RecvError>;
}

#[async_trait]
impl MessageSink for mpsc::Sender<String> {
    async fn send(&mut self, text: String) -> Result<(), SendError> {
        mpsc::Sender::send(self, text)
            .await
            .map_err(|_| SendError::Closed)
    }
}

#[async_trait]
impl MessageSource for mpsc::Receiver<String> {
    async fn receive(&mut self) -> Result<String, RecvError> {
        self.recv().await.ok_or(RecvError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_creation() {
        let (conn, _rx) = connection(7, 4);
        assert_eq!(conn.client_id, 7);
        assert!(conn.connected_at > 0);
        assert!(!conn.is_closed());
    }

    #[test]
    fn test_connection_send() {
        let (conn, mut rx) = connection(1, 4);

        conn.send("test message".to_string()).unwrap();

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg, "test message");
    }

    #[test]
    fn test_connection_send_full() {
        let (conn, mut rx) = connection(1, 2);

        conn.send("a".to_string()).unwrap();
        conn.send("b".to_string()).unwrap();
        assert_eq!(conn.send("c".to_string()), Err(SendError::Full));

        // Earlier messages are untouched
        assert_eq!(rx.try_recv().unwrap(), "a");
        assert_eq!(rx.try_recv().unwrap(), "b");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_connection_send_closed() {
        let (conn, rx) = connection(1, 4);
        drop(rx);

        assert!(conn.is_closed());
        assert_eq!(conn.send("lost".to_string()), Err(SendError::Closed));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let (conn, mut rx) = connection(1, 0);
        conn.send("one".to_string()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), "one");
    }

    #[tokio::test]
    async fn test_channel_transport() {
        let (mut tx, mut rx) = mpsc::channel::<String>(4);

        MessageSink::send(&mut tx, "hello".to_string()).await.unwrap();
        assert_eq!(rx.receive().await.unwrap(), "hello");

        drop(tx);
        assert_eq!(rx.receive().await, Err(RecvError::Disconnected));
    }
}
