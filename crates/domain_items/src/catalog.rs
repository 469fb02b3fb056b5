//! Reporting, editing, and browsing items

use std::collections::HashMap;
use std::sync::Arc;

use core_kernel::{ItemId, PortError, UserId};

use crate::actor::{Actor, UserSummary};
use crate::authorization::{ensure_can_mutate, ItemAction};
use crate::error::ItemError;
use crate::item::{Item, ItemChanges, NewItem};
use crate::ports::{ItemPort, UserDirectoryPort};
use crate::query::ItemFilter;

/// An item with its reporter and claimant resolved for display
///
/// A user missing from the directory resolves to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetails {
    pub item: Item,
    pub reporter: Option<UserSummary>,
    pub claimant: Option<UserSummary>,
}

/// Item service outside the claim workflow
#[derive(Clone)]
pub struct ItemCatalog {
    items: Arc<dyn ItemPort>,
    users: Arc<dyn UserDirectoryPort>,
}

impl ItemCatalog {
    pub fn new(items: Arc<dyn ItemPort>, users: Arc<dyn UserDirectoryPort>) -> Self {
        Self { items, users }
    }

    /// Records a new available item reported by the actor
    pub async fn report(&self, actor: &Actor, report: NewItem) -> Result<Item, ItemError> {
        report.validate()?;
        let item = Item::report(actor.id, report);
        self.items.insert_item(&item).await?;
        tracing::info!(
            item_id = %item.id,
            reported_by = %actor.id,
            item_type = %item.item_type,
            category = %item.category,
            "Item reported"
        );
        Ok(item)
    }

    pub async fn list(&self, filter: &ItemFilter) -> Result<Vec<ItemDetails>, ItemError> {
        let items = self.items.find_items(filter).await?;
        self.describe_all(items).await
    }

    /// The actor's own reports, newest first
    pub async fn list_mine(&self, actor: &Actor) -> Result<Vec<ItemDetails>, ItemError> {
        let items = self.items.find_by_reporter(actor.id).await?;
        self.describe_all(items).await
    }

    pub async fn get_by_id(&self, id: ItemId) -> Result<ItemDetails, ItemError> {
        let item = self.fetch(id).await?;
        self.describe(item).await
    }

    /// Edits the descriptive fields of an item the actor may mutate
    pub async fn update(
        &self,
        actor: &Actor,
        id: ItemId,
        changes: ItemChanges,
    ) -> Result<ItemDetails, ItemError> {
        let item = self.fetch(id).await?;
        ensure_can_mutate(&item, actor, ItemAction::Update)?;
        changes.validate_for(item.status)?;

        let normalized = changes.normalized();
        let updated = if normalized.is_empty() {
            item
        } else {
            self.items
                .update_details(id, &normalized)
                .await
                .map_err(ItemError::from_item_lookup(id))?
        };
        tracing::info!(item_id = %id, updated_by = %actor.id, "Item updated");
        self.describe(updated).await
    }

    /// Deletes an item the actor may mutate, whatever its status
    pub async fn delete(&self, actor: &Actor, id: ItemId) -> Result<(), ItemError> {
        let item = self.fetch(id).await?;
        ensure_can_mutate(&item, actor, ItemAction::Delete)?;
        self.items
            .delete_item(id)
            .await
            .map_err(ItemError::from_item_lookup(id))?;
        tracing::info!(item_id = %id, deleted_by = %actor.id, status = %item.status, "Item deleted");
        Ok(())
    }

    pub async fn describe(&self, item: Item) -> Result<ItemDetails, ItemError> {
        let mut details = self.describe_all(vec![item]).await?;
        details
            .pop()
            .ok_or_else(|| ItemError::Store(PortError::internal("Item could not be described")))
    }

    async fn fetch(&self, id: ItemId) -> Result<Item, ItemError> {
        self.items
            .get_item(id)
            .await
            .map_err(ItemError::from_item_lookup(id))
    }

    async fn describe_all(&self, items: Vec<Item>) -> Result<Vec<ItemDetails>, ItemError> {
        let mut ids: Vec<UserId> = items
            .iter()
            .flat_map(|item| std::iter::once(item.reported_by).chain(item.claimed_by))
            .collect();
        ids.sort();
        ids.dedup();

        let users: HashMap<UserId, UserSummary> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_summaries(&ids)
                .await?
                .into_iter()
                .map(|user| (user.id, user))
                .collect()
        };

        Ok(items
            .into_iter()
            .map(|item| ItemDetails {
                reporter: users.get(&item.reported_by).cloned(),
                claimant: item.claimed_by.and_then(|id| users.get(&id).cloned()),
                item,
            })
            .collect())
    }
}
