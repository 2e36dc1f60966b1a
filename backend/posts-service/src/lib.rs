/// Posts Service Library
///
/// Posts with threaded comments, served over GraphQL.
///
/// # Modules
///
/// - `config`: Configuration management
/// - `db`: Entity store with in-memory and PostgreSQL backends
/// - `error`: Error types and handling
/// - `locks`: Per-key reader/writer locks
/// - `metrics`: Observability and metrics collection
/// - `models`: Data structures for posts and comments
/// - `pagination`: Keyset pagination over `(created_at, id)`
/// - `schema`: GraphQL schema
/// - `services`: Business logic layer
pub mod config;
pub mod db;
pub mod error;
pub mod locks;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod schema;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
