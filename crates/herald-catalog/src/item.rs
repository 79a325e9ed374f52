//! Item types.

use serde::{Deserialize, Serialize};

use crate::unix_now;

/// An item filed under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    pub id: u64,
    /// Display name. Not required to be unique.
    pub name: String,
    /// Owning category.
    pub category_id: u64,
    /// Unix timestamp when the item was created.
    pub created_at: u64,
    /// Unix timestamp when the item was last updated.
    pub updated_at: u64,
}

impl Item {
    /// Creates a new item.
    pub fn new(id: u64, name: impl Into<String>, category_id: u64) -> Self {
        let now = unix_now();
        Self {
            id,
            name: name.into(),
            category_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply(&mut self, update: ItemUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        self.updated_at = unix_now();
    }
}

/// Fields required to create an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    /// Display name.
    pub name: String,
    /// Owning category; must exist.
    pub category_id: u64,
}

/// Partial update for an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    /// New name.
    pub name: Option<String>,
    /// Move to another category; must exist.
    pub category_id: Option<u64>,
}
