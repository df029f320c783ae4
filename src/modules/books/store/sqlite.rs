use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{BookStore, StoreError, StoreResult};
use crate::modules::books::models::{Book, BookPatch, NewBook};

/// Table layout for books. Length limits are not enforced; `isbn` uniqueness is.
pub const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        title          TEXT NOT NULL CHECK (title <> ''),
        author         TEXT NOT NULL CHECK (author <> ''),
        isbn           TEXT NOT NULL CHECK (isbn <> ''),
        published_date TEXT,
        genre          TEXT,
        description    TEXT
    );
    CREATE UNIQUE INDEX IF NOT EXISTS books_isbn_unique ON books (isbn);
"#;

const COLUMNS: &str = "id, title, author, isbn, published_date, genre, description";

/// SQLite-backed book store; ids come from `AUTOINCREMENT` and are never reused.
#[derive(Clone, Debug)]
pub struct SqliteBookStore {
    pool: SqlitePool,
}

impl SqliteBookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn insert(&self, book: &NewBook) -> StoreResult<Book> {
        let sql = format!(
            "INSERT INTO books (title, author, isbn, published_date, genre, description)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(&book.published_date)
            .bind(&book.genre)
            .bind(&book.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, &book.isbn))
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Book>> {
        let sql = format!("SELECT {COLUMNS} FROM books WHERE id = ?");

        Ok(sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        let sql = format!("SELECT {COLUMNS} FROM books ORDER BY id");

        Ok(sqlx::query_as::<_, Book>(&sql).fetch_all(&self.pool).await?)
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(&self, id: i64, patch: &BookPatch) -> StoreResult<Option<Book>> {
        // Single statement, so the unique index arbitrates concurrent writers
        let sql = format!(
            "UPDATE books SET
                title          = COALESCE(?, title),
                author         = COALESCE(?, author),
                isbn           = COALESCE(?, isbn),
                published_date = COALESCE(?, published_date),
                genre          = COALESCE(?, genre),
                description    = COALESCE(?, description)
             WHERE id = ?
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(&patch.title)
            .bind(&patch.author)
            .bind(&patch.isbn)
            .bind(&patch.published_date)
            .bind(&patch.genre)
            .bind(&patch.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, patch.isbn.as_deref().unwrap_or_default()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn classify(error: sqlx::Error, isbn: &str) -> StoreError {
    match &error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateIsbn(isbn.to_string())
        }
        _ => StoreError::Backend(error),
    }
}
