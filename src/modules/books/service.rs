use std::sync::Arc;

use super::error::CatalogError;
use super::models::{Book, BookPayload, BookPatch, NewBook};
use super::store::{BookStore, StoreError};

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Book lifecycle and validation rules, on top of an injected record store.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Every book, in insertion order.
    pub async fn list(&self) -> CatalogResult<Vec<Book>> {
        Ok(self.store.list().await?)
    }

    /// Number of stored books, without loading them.
    pub async fn count(&self) -> CatalogResult<i64> {
        Ok(self.store.count().await?)
    }

    pub async fn get(&self, id: i64) -> CatalogResult<Book> {
        self.store
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Validate and persist a new book.
    ///
    /// Required fields are checked before touching the store; isbn
    /// uniqueness is left to the store's constraint.
    pub async fn create(&self, payload: BookPayload) -> CatalogResult<Book> {
        let new_book = NewBook::try_from(payload)?;

        let book = self.store.insert(&new_book).await.inspect_err(|err| {
            if let StoreError::DuplicateIsbn(isbn) = err {
                tracing::info!(isbn = %isbn, "book rejected: isbn already exists");
            }
        })?;

        tracing::info!(book_id = book.id, isbn = %book.isbn, "book created");
        Ok(book)
    }

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    /// A patch without fields returns the stored book as is.
    pub async fn update(&self, id: i64, patch: BookPatch) -> CatalogResult<Book> {
        let current = self.get(id).await?;
        self.apply_patch(current, patch).await
    }

    /// Update from a raw JSON body; `None` when the request carried none.
    ///
    /// Existence is reported ahead of any problem with the body.
    pub async fn update_from_json(
        &self,
        id: i64,
        body: Option<serde_json::Value>,
    ) -> CatalogResult<Book> {
        let current = self.get(id).await?;
        let patch = BookPatch::from_json(body)?;
        self.apply_patch(current, patch).await
    }

    async fn apply_patch(&self, current: Book, patch: BookPatch) -> CatalogResult<Book> {
        if patch.is_empty() {
            tracing::debug!(book_id = current.id, "update carried no changes");
            return Ok(current);
        }
        patch.validate()?;

        let id = current.id;
        let book = self
            .store
            .update(id, &patch)
            .await?
            // Deleted between the lookup and the write
            .ok_or(CatalogError::NotFound(id))?;

        tracing::info!(book_id = book.id, isbn = %book.isbn, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        if !self.store.delete(id).await? {
            return Err(CatalogError::NotFound(id));
        }

        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}
