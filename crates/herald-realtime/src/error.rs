//! Error types for the real-time module.

use thiserror::Error;

/// Errors that can occur in hub operations.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The hub refuses new connections.
    #[error("connection limit reached: max {0} connections")]
    CapacityReached(usize),
}

/// Failure to deliver one message to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The underlying channel is gone.
    #[error("connection closed")]
    Closed,

    /// The outbound queue is full; the client is not keeping up.
    #[error("outbound queue full")]
    Full,

    /// The transport did not accept the write in time.
    #[error("write timed out")]
    TimedOut,
}

/// Failure to read the next inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecvError {
    /// The peer closed the connection, cleanly or not.
    #[error("client disconnected")]
    Disconnected,

    /// The transport reported an error; the connection is unusable.
    #[error("transport error: {0}")]
    Transport(String),
}
