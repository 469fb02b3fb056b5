//! Lost-and-Found Item Domain
//!
//! This crate holds the claim lifecycle of campus lost-and-found reports:
//! the item model, the claim state machine, ownership checks, and the
//! notifications that follow each claim decision.
//!
//! # Claim Lifecycle
//!
//! - **Report**: a user reports an item as lost or found; it starts `available`
//! - **Claim**: any other authenticated user may claim it; it becomes `pending`
//! - **Resolve**: the reporter (or an admin) approves, making it `claimed`,
//!   or rejects, returning it to `available` for the next claimant
//!
//! `claimed_by` is set exactly while the item is `pending` or `claimed`.
//!
//! # Services
//!
//! - [`ItemCatalog`]: report, browse, edit, and delete items
//! - [`ClaimWorkflow`]: submit and resolve claims
//! - [`NotificationInbox`]: read and acknowledge notifications
//!
//! All storage goes through the traits in [`ports`]; enable the `mock`
//! feature for in-memory adapters.

pub mod actor;
pub mod authorization;
pub mod catalog;
pub mod error;
pub mod idempotency;
pub mod item;
pub mod notification;
pub mod ports;
pub mod query;
pub mod workflow;


pub use actor::{Actor, Role, UserSummary};
pub use authorization::{can_mutate, ensure_can_mutate, ItemAction};
pub use catalog::{ItemCatalog, ItemDetails};
pub use error::ItemError;
pub use idempotency::{ClaimOperation, IdempotencyRecord};
pub use item::{Item, ItemCategory, ItemChanges, ItemStatus, ItemType, NewItem};
pub use notification::{Notification, NotificationDispatcher, NotificationInbox, NotificationType};
pub use ports::{IdempotencyPort, ItemPort, NotificationPort, TransitionOutcome, UserDirectoryPort};
pub use query::ItemFilter;
pub use workflow::{ClaimTransition, ClaimWorkflow, ClaimantUpdate};
