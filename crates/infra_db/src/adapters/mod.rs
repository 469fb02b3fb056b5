//! Domain Adapters
//!
//! PostgreSQL implementations of the `domain_items` ports. Each adapter:
//! - Implements one port trait
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresItemAdapter;
//! use domain_items::ItemPort;
//!
//! let adapter = PostgresItemAdapter::new(pool);
//! let item = adapter.get_item(item_id).await?;
//! ```

pub mod items;
pub mod notifications;
pub mod users;
pub mod idempotency;

pub use items::PostgresItemAdapter;
pub use notifications::PostgresNotificationAdapter;
pub use users::PostgresUserDirectory;
pub use idempotency::PostgresIdempotencyAdapter;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult, PortError};

use crate::error::DatabaseError;

/// Translates database errors into port errors
///
/// - `NotFound` -> `PortError::NotFound`
/// - unique violations -> `PortError::Conflict`
/// - check violations -> `PortError::Validation`
/// - connection problems -> `PortError::Connection`
/// - everything else -> `PortError::Internal`
pub(crate) fn db_to_port_error(e: DatabaseError) -> PortError {
    match e {
        DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
        DatabaseError::DuplicateEntry(message) => PortError::conflict(message),
        DatabaseError::ConstraintViolation(message) => PortError::validation(message),
        DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => PortError::Connection {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
        other => PortError::Internal {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

/// Runs `SELECT 1` against the pool
pub(crate) async fn probe(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
