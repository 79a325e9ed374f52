//! Catalog of categories and items for Herald.
//!
//! This crate holds the data whose changes Herald announces. Every successful
//! mutation returns the committed entity so the caller can describe it in a
//! notification; failed mutations change nothing and must not be announced.

mod category;
mod error;
mod item;
mod store;

pub use category::{Category, CategoryUpdate};
pub use error::CatalogError;
pub use item::{Item, ItemUpdate, NewItem};
pub use store::{CatalogStore, Page, DEFAULT_PAGE_LIMIT, MAX_NAME_LENGTH};

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
