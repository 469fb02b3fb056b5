//! Repository implementations
//!
//! Repositories encapsulate SQL and map between database rows and plain
//! column types. They know nothing about the domain; the adapters in
//! [`crate::adapters`] translate rows into domain values.
//!
//! Queries are built at runtime (`sqlx::query_as` with `FromRow` rows), so
//! the crate compiles without a live database.

pub mod items;
pub mod notifications;
pub mod users;
pub mod idempotency;

pub use items::ItemRepository;
pub use notifications::NotificationRepository;
pub use users::UserRepository;
pub use idempotency::IdempotencyRepository;
