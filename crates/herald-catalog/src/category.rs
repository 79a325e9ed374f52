//! Category types.

use serde::{Deserialize, Serialize};

use crate::unix_now;

/// A named group of items. Names are unique across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Unix timestamp when the category was created.
    pub created_at: u64,
    /// Unix timestamp when the category was last updated.
    pub updated_at: u64,
}

impl Category {
    /// Creates a new category.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        let now = unix_now();
        Self {
            id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update. Fields left as `None` are untouched.
    pub(crate) fn apply(&mut self, update: CategoryUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        self.updated_at = unix_now();
    }
}

/// Partial update for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    /// New name.
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new() {
        let category = Category::new(1, "Books");
        assert_eq!(category.id, 1);
        assert_eq!(category.name, "Books");
        assert_eq!(category.created_at, category.updated_at);
    }

    #[test]
    fn test_empty_update_keeps_name() {
        let mut category = Category::new(1, "Books");
        category.apply(CategoryUpdate::default());
        assert_eq!(category.name, "Books");
    }

    #[test]
    fn test_update_deserializes_missing_fields() {
        let update: CategoryUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(update.name, None);
    }
}
