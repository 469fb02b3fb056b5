//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! lost-and-found test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built actors, users, and item reports
//! - `builders`: Builder patterns for items in any lifecycle state
//! - `database`: PostgreSQL testcontainer management
//! - `assertions`: Assertion helpers for items and notifications
//! - `generators`: Property-based and fake data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
