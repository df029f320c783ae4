//! Book catalog application library
//!
//! Wires the books module onto the kernel, the SQLite store, and the HTTP layer.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::App;
