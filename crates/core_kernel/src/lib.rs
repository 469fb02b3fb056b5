//! Core Kernel - Foundational types shared by every crate of the lost-and-found service
//!
//! This crate provides the fundamental building blocks used across the workspace:
//! - Strongly-typed identifiers for items, users, and notifications
//! - The kernel error type
//! - Port infrastructure for the hexagonal (ports and adapters) layout

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{ItemId, UserId, NotificationId, IdempotencyKey};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
