//! Integration tests for the catalog HTTP API

use axum::http::{HeaderName, StatusCode};
use axum_test::TestServer;
use catalog_app::App;
use catalog_kernel::settings::Settings;
use serde_json::{json, Value};

/// Create a test server over a private in-memory database
async fn create_test_server() -> TestServer {
    let mut settings = Settings::default();
    settings.database.url = "sqlite::memory:".to_string();

    let app = App::build(settings)
        .await
        .expect("Failed to build application");
    TestServer::new(app.router()).expect("Failed to create test server")
}

async fn create_book(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/books").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "OK");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_list_books_empty() {
    let server = create_test_server().await;

    let response = server.get("/api/books").await;

    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn test_book_lifecycle_scenario() {
    let server = create_test_server().await;

    // Create: id assigned, optionals null
    let created = create_book(
        &server,
        json!({ "title": "A", "author": "B", "isbn": "123" }),
    )
    .await;
    assert_eq!(
        created,
        json!({
            "id": 1,
            "title": "A",
            "author": "B",
            "isbn": "123",
            "published_date": null,
            "genre": null,
            "description": null
        })
    );

    // Same isbn again
    let duplicate = server
        .post("/api/books")
        .json(&json!({ "title": "A2", "author": "B2", "isbn": "123" }))
        .await;
    duplicate.assert_status_bad_request();
    duplicate.assert_json(&json!({ "error": "ISBN already exists" }));

    // Partial update
    let updated = server
        .put("/api/books/1")
        .json(&json!({ "author": "C" }))
        .await;
    updated.assert_status_ok();
    let updated: Value = updated.json();
    assert_eq!(updated["title"], "A");
    assert_eq!(updated["author"], "C");
    assert_eq!(updated["isbn"], "123");

    // Delete, then the book is gone
    let deleted = server.delete("/api/books/1").await;
    deleted.assert_status_ok();
    let deleted: Value = deleted.json();
    assert!(deleted["message"].is_string());

    let missing = server.get("/api/books/1").await;
    missing.assert_status_not_found();
    let missing: Value = missing.json();
    assert!(missing["error"].is_string());
}

#[tokio::test]
async fn test_get_after_create_matches() {
    let server = create_test_server().await;
    let created = create_book(
        &server,
        json!({
            "title": "Dom Casmurro",
            "author": "Machado de Assis",
            "isbn": "978-85-359-0277-5",
            "published_date": "1899",
            "genre": "Romance",
            "description": "Narrado por Bento Santiago."
        }),
    )
    .await;

    let response = server.get(&format!("/api/books/{}", created["id"])).await;

    response.assert_status_ok();
    response.assert_json(&created);
}

#[tokio::test]
async fn test_list_returns_books_in_creation_order() {
    let server = create_test_server().await;
    for isbn in ["3", "1", "2"] {
        create_book(&server, json!({ "title": "T", "author": "A", "isbn": isbn })).await;
    }

    let books: Vec<Value> = server.get("/api/books").await.json();

    let isbns: Vec<&str> = books.iter().map(|b| b["isbn"].as_str().unwrap()).collect();
    assert_eq!(isbns, vec!["3", "1", "2"]);
    for book in &books {
        server
            .get(&format!("/api/books/{}", book["id"]))
            .await
            .assert_json(book);
    }
}

#[tokio::test]
async fn test_create_missing_required_fields() {
    let server = create_test_server().await;

    for body in [
        json!({ "author": "B", "isbn": "1" }),
        json!({ "title": "A", "isbn": "1" }),
        json!({ "title": "A", "author": "B" }),
        json!({ "title": "", "author": "B", "isbn": "1" }),
        json!({}),
    ] {
        let response = server.post("/api/books").json(&body).await;
        response.assert_status_bad_request();
        let error: Value = response.json();
        assert!(error["error"].is_string());
    }

    server.get("/api/books").await.assert_json(&json!([]));
}

#[tokio::test]
async fn test_create_without_body() {
    let server = create_test_server().await;

    let response = server.post("/api/books").await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_create_ignores_client_id() {
    let server = create_test_server().await;

    let created = create_book(
        &server,
        json!({ "id": 42, "title": "A", "author": "B", "isbn": "1" }),
    )
    .await;

    assert_eq!(created["id"], 1);
}

#[tokio::test]
async fn test_update_missing_book() {
    let server = create_test_server().await;

    let response = server
        .put("/api/books/99")
        .json(&json!({ "title": "X" }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_update_empty_payload() {
    let server = create_test_server().await;
    create_book(&server, json!({ "title": "A", "author": "B", "isbn": "1" })).await;

    let response = server.put("/api/books/1").json(&json!({})).await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "no data provided" }));
}

#[tokio::test]
async fn test_update_with_null_keeps_value() {
    let server = create_test_server().await;
    create_book(
        &server,
        json!({ "title": "A", "author": "B", "isbn": "1", "genre": "Romance" }),
    )
    .await;

    let response = server
        .put("/api/books/1")
        .json(&json!({ "genre": null, "title": "A2" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["genre"], "Romance");
    assert_eq!(body["title"], "A2");
}

#[tokio::test]
async fn test_update_without_body() {
    let server = create_test_server().await;
    create_book(&server, json!({ "title": "A", "author": "B", "isbn": "1" })).await;

    let response = server.put("/api/books/1").await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "no data provided" }));
}

#[tokio::test]
async fn test_update_with_only_nulls_is_a_no_op() {
    let server = create_test_server().await;
    let created = create_book(
        &server,
        json!({ "title": "A", "author": "B", "isbn": "1", "genre": "Romance" }),
    )
    .await;

    let response = server
        .put("/api/books/1")
        .json(&json!({ "genre": null }))
        .await;

    response.assert_status_ok();
    response.assert_json(&created);
    server.get("/api/books/1").await.assert_json(&created);
}

#[tokio::test]
async fn test_update_with_only_unknown_keys_is_a_no_op() {
    let server = create_test_server().await;
    let created = create_book(&server, json!({ "title": "A", "author": "B", "isbn": "1" })).await;

    let response = server.put("/api/books/1").json(&json!({ "id": 5 })).await;

    response.assert_status_ok();
    response.assert_json(&created);
}

#[tokio::test]
async fn test_update_with_wrong_field_type_reports_decode_error() {
    let server = create_test_server().await;
    let created = create_book(&server, json!({ "title": "A", "author": "B", "isbn": "1" })).await;

    let response = server
        .put("/api/books/1")
        .json(&json!({ "title": "X", "genre": 7 }))
        .await;

    response.assert_status_bad_request();
    let error: Value = response.json();
    let message = error["error"].as_str().unwrap();
    assert!(message.starts_with("invalid book data"), "{message}");
    server.get("/api/books/1").await.assert_json(&created);
}

#[tokio::test]
async fn test_update_missing_book_with_bad_body_is_not_found() {
    let server = create_test_server().await;

    let response = server
        .put("/api/books/5")
        .json(&json!({ "genre": 7 }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_create_with_wrong_field_type_reports_decode_error() {
    let server = create_test_server().await;

    let response = server
        .post("/api/books")
        .json(&json!({ "title": "A", "author": "B", "isbn": 123 }))
        .await;

    response.assert_status_bad_request();
    let error: Value = response.json();
    assert!(error["error"].as_str().unwrap().starts_with("invalid book data"));
    server.get("/api/books").await.assert_json(&json!([]));
}

#[tokio::test]
async fn test_update_to_existing_isbn() {
    let server = create_test_server().await;
    create_book(&server, json!({ "title": "A", "author": "B", "isbn": "111" })).await;
    create_book(&server, json!({ "title": "C", "author": "D", "isbn": "222" })).await;

    let response = server
        .put("/api/books/2")
        .json(&json!({ "isbn": "111" }))
        .await;

    response.assert_status_bad_request();
    let book: Value = server.get("/api/books/2").await.json();
    assert_eq!(book["isbn"], "222");
}

#[tokio::test]
async fn test_update_keeping_own_isbn() {
    let server = create_test_server().await;
    create_book(&server, json!({ "title": "A", "author": "B", "isbn": "111" })).await;

    let response = server
        .put("/api/books/1")
        .json(&json!({ "isbn": "111", "genre": "Poesia" }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_delete_missing_book() {
    let server = create_test_server().await;

    let response = server.delete("/api/books/7").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_non_integer_id_is_rejected_by_router() {
    let server = create_test_server().await;

    let response = server.get("/api/books/not-a-number").await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let server = create_test_server().await;

    let response = server.get("/api/books").await;

    response.assert_status_ok();
    assert!(!response.header(HeaderName::from_static("x-request-id")).is_empty());
}

#[tokio::test]
async fn test_openapi_lists_book_paths() {
    let server = create_test_server().await;

    let document: Value = server.get("/docs/openapi.json").await.json();

    assert!(document["paths"]["/api/books"]["post"].is_object());
    assert!(document["paths"]["/api/books/{id}"]["put"].is_object());
    assert!(document["components"]["schemas"]["Book"].is_object());
}
