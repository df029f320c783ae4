use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError, StoreResult};
use crate::modules::books::models::{Book, BookPatch, NewBook};

/// In-memory book store (for testing).
///
/// The uniqueness check and the write happen under one write lock, which is
/// what makes it equivalent to the SQLite unique index.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    books: BTreeMap<i64, Book>,
}

impl State {
    fn isbn_taken(&self, isbn: &str, except: Option<i64>) -> bool {
        self.books
            .values()
            .any(|book| book.isbn == isbn && Some(book.id) != except)
    }
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn insert(&self, book: &NewBook) -> StoreResult<Book> {
        let mut state = self.state.write().await;
        if state.isbn_taken(&book.isbn, None) {
            return Err(StoreError::DuplicateIsbn(book.isbn.clone()));
        }

        state.last_id += 1;
        let stored = Book {
            id: state.last_id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            published_date: book.published_date.clone(),
            genre: book.genre.clone(),
            description: book.description.clone(),
        };
        state.books.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Book>> {
        Ok(self.state.read().await.books.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        Ok(self.state.read().await.books.values().cloned().collect())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.state.read().await.books.len() as i64)
    }

    async fn update(&self, id: i64, patch: &BookPatch) -> StoreResult<Option<Book>> {
        let mut state = self.state.write().await;
        let Some(current) = state.books.get(&id) else {
            return Ok(None);
        };

        if let Some(isbn) = &patch.isbn {
            if state.isbn_taken(isbn, Some(id)) {
                return Err(StoreError::DuplicateIsbn(isbn.clone()));
            }
        }

        let updated = patch.apply_to(current);
        state.books.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.state.write().await.books.remove(&id).is_some())
    }
}
