//! In-memory storage for the catalog.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    error::CatalogError, Category, CategoryUpdate, Item, ItemUpdate, NewItem, Result,
};

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Longest accepted name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Offset pagination for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Entries to skip.
    #[serde(default)]
    pub skip: usize,
    /// Maximum entries to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// In-memory store for categories and items.
///
/// Thread-safe; listings are ordered by id. Each mutation is committed before
/// it returns, so a caller announcing the result never announces a change
/// that did not happen.
#[derive(Default)]
pub struct CatalogStore {
    /// Categories indexed by id.
    categories: RwLock<BTreeMap<u64, Category>>,
    /// Items indexed by id.
    items: RwLock<BTreeMap<u64, Item>>,
    next_category_id: AtomicU64,
    next_item_id: AtomicU64,
}

impl CatalogStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Categories ====================

    /// Creates a new category.
    pub fn create_category(&self, name: &str) -> Result<Category> {
        let name = validate_name(name)?;
        let mut categories = self.categories.write();

        if categories.values().any(|c| c.name == name) {
            return Err(CatalogError::DuplicateCategory { name });
        }

        let id = self.next_category_id.fetch_add(1, Ordering::SeqCst) + 1;
        let category = Category::new(id, name);
        categories.insert(id, category.clone());
        Ok(category)
    }

    /// Lists categories.
    pub fn list_categories(&self, page: Page) -> Vec<Category> {
        self.categories
            .read()
            .values()
            .skip(page.skip)
            .take(page.limit)
            .cloned()
            .collect()
    }

    /// Gets a category by id.
    pub fn get_category(&self, id: u64) -> Result<Category> {
        self.categories
            .read()
            .get(&id)
            .cloned()
            .ok_or(CatalogError::CategoryNotFound { id })
    }

    /// Updates a category.
    pub fn update_category(&self, id: u64, mut update: CategoryUpdate) -> Result<Category> {
        if let Some(name) = update.name.take() {
            update.name = Some(validate_name(&name)?);
        }

        let mut categories = self.categories.write();

        if let Some(name) = &update.name {
            if categories.values().any(|c| c.id != id && &c.name == name) {
                return Err(CatalogError::DuplicateCategory { name: name.clone() });
            }
        }

        let category = categories
            .get_mut(&id)
            .ok_or(CatalogError::CategoryNotFound { id })?;
        category.apply(update);
        Ok(category.clone())
    }

    /// Deletes a category.
    ///
    /// Items that reference it are left in place.
    pub fn delete_category(&self, id: u64) -> Result<Category> {
        self.categories
            .write()
            .remove(&id)
            .ok_or(CatalogError::CategoryNotFound { id })
    }

    /// Number of categories.
    pub fn category_count(&self) -> usize {
        self.categories.read().len()
    }

    // ==================== Items ====================

    /// Creates a new item.
    pub fn create_item(&self, new: NewItem) -> Result<Item> {
        let name = validate_name(&new.name)?;

        // Held until the insert so the category cannot be deleted in between
        let categories = self.categories.read();
        ensure_category(&categories, new.category_id)?;

        let id = self.next_item_id.fetch_add(1, Ordering::SeqCst) + 1;
        let item = Item::new(id, name, new.category_id);
        self.items.write().insert(id, item.clone());
        Ok(item)
    }

    /// Lists items.
    pub fn list_items(&self, page: Page) -> Vec<Item> {
        self.items
            .read()
            .values()
            .skip(page.skip)
            .take(page.limit)
            .cloned()
            .collect()
    }

    /// Gets an item by id.
    pub fn get_item(&self, id: u64) -> Result<Item> {
        self.items
            .read()
            .get(&id)
            .cloned()
            .ok_or(CatalogError::ItemNotFound { id })
    }

    /// Updates an item.
    pub fn update_item(&self, id: u64, mut update: ItemUpdate) -> Result<Item> {
        if let Some(name) = update.name.take() {
            update.name = Some(validate_name(&name)?);
        }
        let categories = self.categories.read();
        if let Some(category_id) = update.category_id {
            ensure_category(&categories, category_id)?;
        }

        let mut items = self.items.write();
        let item = items.get_mut(&id).ok_or(CatalogError::ItemNotFound { id })?;
        item.apply(update);
        Ok(item.clone())
    }

    /// Deletes an item.
    pub fn delete_item(&self, id: u64) -> Result<Item> {
        self.items
            .write()
            .remove(&id)
            .ok_or(CatalogError::ItemNotFound { id })
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.items.read().len()
    }
}

fn ensure_category(categories: &BTreeMap<u64, Category>, id: u64) -> Result<()> {
    if categories.contains_key(&id) {
        Ok(())
    } else {
        Err(CatalogError::CategoryNotFound { id })
    }
}

/// Trim a name and check it is usable.
fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation("name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CatalogError::Validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}
