use catalog_http::error::AppError;
use thiserror::Error;

use super::store::StoreError;

/// Failures of catalog operations. All of them are local to one request.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    InvalidInput(String),

    #[error("ISBN already exists")]
    DuplicateKey(String),

    #[error("storage unavailable")]
    StorageUnavailable(#[source] sqlx::Error),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIsbn(isbn) => CatalogError::DuplicateKey(isbn),
            StoreError::Backend(source) => CatalogError::StorageUnavailable(source),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => AppError::not_found(err.to_string()),
            CatalogError::InvalidInput(message) => {
                AppError::bad_request_with_code(message, "invalid_input")
            }
            CatalogError::DuplicateKey(_) => {
                AppError::bad_request_with_code(err.to_string(), "duplicate_isbn")
            }
            CatalogError::StorageUnavailable(source) => {
                tracing::error!(error = %source, "book store failure");
                AppError::unavailable("storage unavailable")
            }
        }
    }
}
