//! Item domain errors

use thiserror::Error;

use core_kernel::{CoreError, ItemId, NotificationId, PortError};
use crate::authorization::ItemAction;
use crate::item::ItemStatus;

/// Errors that can occur in the item domain
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found")]
    ItemNotFound(ItemId),

    #[error("Notification not found")]
    NotificationNotFound(NotificationId),

    #[error("{0}")]
    Forbidden(ItemAction),

    /// Transition attempted from the wrong source state
    #[error("{message}")]
    Conflict { message: String, current: ItemStatus },

    #[error("{0}")]
    Validation(String),

    /// The item mutation is durable; only the notification is missing
    #[error("Item {item_id} was updated but its notification could not be recorded")]
    NotificationFailed {
        item_id: ItemId,
        #[source]
        source: PortError,
    },

    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl ItemError {
    pub fn validation(message: impl Into<String>) -> Self {
        ItemError::Validation(message.into())
    }

    /// Maps a store lookup failure, turning NotFound into [`ItemError::ItemNotFound`]
    pub fn from_item_lookup(item_id: ItemId) -> impl FnOnce(PortError) -> ItemError {
        move |err| {
            if err.is_not_found() {
                ItemError::ItemNotFound(item_id)
            } else {
                ItemError::Store(err)
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ItemError::Conflict { .. })
    }
}

impl From<CoreError> for ItemError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) | CoreError::InvalidStateTransition(message) => {
                ItemError::Validation(message)
            }
        }
    }
}
