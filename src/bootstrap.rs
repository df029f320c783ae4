//! Process lifecycle: open storage, prepare the schema, serve, shut down.

use anyhow::Context;
use axum::Router;
use catalog_db::Database;
use catalog_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A fully wired application: storage is open and the schema is in place.
pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Open the database, register modules, and run schema initialization.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database)
            .await
            .context("failed to open the book store")?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db).context("failed to register modules")?;

        db.initialize(&registry.collect_migrations())
            .await
            .context("failed to initialize the schema")?;

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The complete HTTP router, without binding a socket.
    pub fn router(&self) -> Router {
        catalog_http::build_router(&self.registry, &self.settings)
    }

    /// Run modules and the HTTP server until shutdown, then release storage.
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };

        self.registry.init_modules(&ctx).await?;
        self.registry.start_modules(&ctx).await?;

        let served = catalog_http::start_server(&self.registry, &self.settings).await;

        let stopped = self.registry.stop_modules().await;
        self.db.close().await;

        served?;
        stopped
    }

    /// Release storage without serving.
    pub async fn close(self) {
        self.db.close().await;
    }
}

/// Prepare the schema and exit.
pub async fn migrate(settings: Settings) -> anyhow::Result<()> {
    let app = App::build(settings).await?;
    tracing::info!(
        modules = app.registry().module_count(),
        "schema initialization complete"
    );
    app.close().await;
    Ok(())
}
