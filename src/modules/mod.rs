pub mod books;

use std::sync::Arc;

use catalog_db::Database;
use catalog_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database) -> anyhow::Result<()> {
    let store = Arc::new(books::store::SqliteBookStore::new(db.pool().clone()));
    registry.register(books::create_module(store))?;
    Ok(())
}
