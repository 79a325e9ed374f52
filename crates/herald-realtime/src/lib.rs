//! # Herald Real-time
//!
//! Broadcast hub for Herald: fans plain-text notifications out to every
//! connected client, independently of whatever triggered them.
//!
//! ## Features
//!
//! - **Registry**: Thread-safe membership keyed by a stable [`ConnectionHandle`]
//! - **Hub**: `join`, `leave`, `send` and `broadcast` with best-effort delivery
//! - **Session Loop**: Per-connection read loop with echo and fan-out
//! - **Notifier**: Background dispatch so request handlers never wait on clients
//!
//! ## Example
//!
//! ```rust
//! use herald_realtime::{connection, Hub};
//!
//! let hub = Hub::default();
//!
//! // Register a client; it receives its own join notice
//! let (conn, mut outbound) = connection(7, 16);
//! let handle = hub.join(conn).unwrap();
//! assert_eq!(outbound.try_recv().unwrap(), "Client #7 joined the chat");
//!
//! // Deliver to everyone
//! hub.broadcast("Category added: Books");
//! assert_eq!(outbound.try_recv().unwrap(), "Category added: Books");
//!
//! hub.leave(handle);
//! assert_eq!(hub.connection_count(), 0);
//! ```
//!
//! ## Wire Protocol
//!
//! Plain UTF-8 text frames in both directions, no envelope:
//!
//! ```text
//! Client #7 joined the chat
//! You wrote: hi            (to the author only)
//! Client #7 says: hi       (to everyone)
//! Client #7 left the chat
//! Category added: Books
//! Item deleted: ID 42
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                   Hub                    │
//! │  ┌────────────────────────────────────┐  │
//! │  │             Registry               │  │
//! │  │  handle -> Connection              │  │
//! │  │    └─> client_id                   │  │
//! │  │    └─> bounded outbound queue      │  │
//! │  └────────────────────────────────────┘  │
//! │        snapshot, then deliver            │
//! └──────────────────────────────────────────┘
//!        ▲                       │
//!   join/leave/relay       outbound queue
//!        │                       ▼
//! ┌──────────────┐        ┌──────────────┐
//! │ Session loop │        │ Writer task  │──> socket
//! └──────────────┘        └──────────────┘
//! ```

pub mod connection;
pub mod error;
pub mod event;
pub mod hub;
pub mod notifier;
pub mod registry;
pub mod session;

// Re-export main types
pub use connection::{
    connection, ClientId, Connection, MessageSink, MessageSource, Outbound,
    DEFAULT_OUTBOUND_CAPACITY,
};
pub use error::{RealtimeError, RecvError, SendError};
pub use event::{ChatMessage, EntityEvent, EntityKind};
pub use hub::{Hub, HubConfig, HubStats};
pub use notifier::{Notifier, DEFAULT_NOTIFIER_CAPACITY};
pub use registry::{ConnectionHandle, Registry, Snapshot};
pub use session::{run_session, SessionConfig, SessionSummary, DEFAULT_WRITE_TIMEOUT};
