//! Error types for catalog operations.

use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Category not found.
    #[error("category not found: {id}")]
    CategoryNotFound { id: u64 },

    /// Item not found.
    #[error("item not found: {id}")]
    ItemNotFound { id: u64 },

    /// Category name already taken.
    #[error("category already exists: {name}")]
    DuplicateCategory { name: String },

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}
