//! HTTP server facade for the catalog service: Axum router, error mapping, and OpenAPI.

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use catalog_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server and serve until Ctrl-C
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let address = settings.server.bind_address();
    tracing::info!("starting HTTP server on {}", address);

    let app = build_router(registry, settings);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {}", address))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    RouterBuilder::new()
        .route("/api/health", get(health_check))
        .mount_modules(registry)
        .with_openapi(registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Health check endpoint; answers while the process is up, regardless of storage
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "API is running",
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, keep serving rather than exiting at once
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_health_check() {
        let router = build_router(&ModuleRegistry::new(), &Settings::default());
        let server = TestServer::new(router).unwrap();

        let response = server.get("/api/health").await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "status": "OK",
            "message": "API is running"
        }));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let router = build_router(&ModuleRegistry::new(), &Settings::default());
        let server = TestServer::new(router).unwrap();

        let response = server.get("/docs/openapi.json").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["openapi"], "3.0.0");
    }
}
