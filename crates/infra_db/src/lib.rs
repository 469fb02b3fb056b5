//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the lost-and-found service using SQLx.
//!
//! # Architecture
//!
//! - [`repositories`]: SQL and row types, no domain knowledge
//! - [`adapters`]: implementations of the `domain_items` ports on top of the
//!   repositories
//! - [`pool`]: connection pool configuration and embedded migrations
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresItemAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/lost_found")).await?;
//! run_migrations(&pool).await?;
//! let items = PostgresItemAdapter::new(pool.clone());
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
pub use error::DatabaseError;
pub use adapters::{
    PostgresIdempotencyAdapter, PostgresItemAdapter, PostgresNotificationAdapter,
    PostgresUserDirectory,
};
