//! Record store seam for the books module.

mod memory;
mod sqlite;

pub use memory::InMemoryBookStore;
pub use sqlite::{SqliteBookStore, SCHEMA as SQLITE_SCHEMA};

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Book, BookPatch, NewBook};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The unique constraint on `isbn` rejected the write
    #[error("isbn {0} is already taken")]
    DuplicateIsbn(String),

    #[error("database failure: {0}")]
    Backend(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable book storage keyed by an auto-assigned integer id.
///
/// Implementations own the isbn uniqueness constraint: `insert` and `update`
/// must fail with `DuplicateIsbn` atomically, never via check-then-write.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a book, assigning it a fresh id
    async fn insert(&self, book: &NewBook) -> StoreResult<Book>;

    /// Fetch a book by id
    async fn get(&self, id: i64) -> StoreResult<Option<Book>>;

    /// All books in insertion order
    async fn list(&self) -> StoreResult<Vec<Book>>;

    /// Number of stored books
    async fn count(&self) -> StoreResult<i64>;

    /// Overwrite the fields present in `patch`; `None` if the id is absent
    async fn update(&self, id: i64, patch: &BookPatch) -> StoreResult<Option<Book>>;

    /// Remove a book; `false` if the id is absent
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}
