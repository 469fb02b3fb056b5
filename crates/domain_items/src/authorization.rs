//! Ownership-based access control for item mutations

use std::fmt;

use crate::actor::Actor;
use crate::error::ItemError;
use crate::item::Item;

/// Mutations that require ownership of the item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Update,
    Delete,
    ResolveClaim,
}

impl fmt::Display for ItemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ItemAction::Update => "Not authorized to update this item",
            ItemAction::Delete => "Not authorized to delete this item",
            ItemAction::ResolveClaim => "Not authorized to process this claim",
        };
        f.write_str(message)
    }
}

/// Admins may mutate any item; everyone else only the items they reported
pub fn can_mutate(item: &Item, actor: &Actor) -> bool {
    actor.is_admin() || item.is_reported_by(actor.id)
}

pub fn ensure_can_mutate(item: &Item, actor: &Actor, action: ItemAction) -> Result<(), ItemError> {
    if can_mutate(item, actor) {
        Ok(())
    } else {
        tracing::warn!(
            item_id = %item.id,
            user_id = %actor.id,
            action = ?action,
            "Rejected mutation by non-owner"
        );
        Err(ItemError::Forbidden(action))
    }
}
