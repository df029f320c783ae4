//! HTTP handlers for `/api/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_http::error::AppError;
use serde_json::Value;

use super::models::{Book, BookPayload, DeleteResponse};
use super::service::CatalogService;

/// Build the books router, relative to the module mount point.
pub fn router(service: CatalogService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

/// A missing body, or one that is not JSON at all, counts as no body.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Option<Value> {
    match payload {
        Ok(Json(value)) => Some(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "request body ignored");
            None
        }
    }
}

async fn list_books(State(service): State<CatalogService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list().await?))
}

async fn get_book(
    State(service): State<CatalogService>,
    Path(id): Path<i64>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.get(id).await?))
}

async fn create_book(
    State(service): State<CatalogService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let payload = BookPayload::from_json(json_body(payload))?;
    let book = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(service): State<CatalogService>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.update_from_json(id, json_body(payload)).await?))
}

async fn delete_book(
    State(service): State<CatalogService>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    service.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
