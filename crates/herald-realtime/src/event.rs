//! Text of every message the hub sends.
//!
//! Messages are plain UTF-8 with no envelope. Keeping the wording here means
//! the session loop and the HTTP handlers cannot drift apart.

use crate::connection::ClientId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat traffic and membership announcements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    /// A client has joined.
    Joined { client_id: ClientId },
    /// A client has left.
    Left { client_id: ClientId },
    /// Private acknowledgment to the author of a message.
    Echo { text: String },
    /// A message relayed to everyone.
    Says { client_id: ClientId, text: String },
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMessage::Joined { client_id } => write!(f, "Client #{} joined the chat", client_id),
            ChatMessage::Left { client_id } => write!(f, "Client #{} left the chat", client_id),
            ChatMessage::Echo { text } => write!(f, "You wrote: {}", text),
            ChatMessage::Says { client_id, text } => {
                write!(f, "Client #{} says: {}", client_id, text)
            }
        }
    }
}

/// Kinds of catalog entities that produce notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A product category.
    Category,
    /// An item within a category.
    Item,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Category => write!(f, "Category"),
            EntityKind::Item => write!(f, "Item"),
        }
    }
}

/// A committed change to a catalog entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EntityEvent {
    /// Entity created.
    Added { kind: EntityKind, name: String },
    /// Entity modified.
    Updated { kind: EntityKind, name: String },
    /// Entity removed.
    Deleted { kind: EntityKind, id: u64 },
}

impl EntityEvent {
    /// Entity kind this event is about.
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityEvent::Added { kind, .. }
            | EntityEvent::Updated { kind, .. }
            | EntityEvent::Deleted { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for EntityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityEvent::Added { kind, name } => write!(f, "{} added: {}", kind, name),
            EntityEvent::Updated { kind, name } => write!(f, "{} updated: {}", kind, name),
            EntityEvent::Deleted { kind, id } => write!(f, "{} deleted: ID {}", kind, id),
        }
    }
}
