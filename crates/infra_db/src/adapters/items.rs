//! PostgreSQL Item Adapter
//!
//! Implements `ItemPort` over the `ItemRepository`. Claim transitions map to
//! the repository's single-statement compare-and-swap.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, ItemId, PortError, UserId};
use domain_items::{
    ClaimTransition, ClaimantUpdate, Item, ItemCategory, ItemChanges, ItemFilter, ItemPort,
    ItemStatus, ItemType, TransitionOutcome,
};

use super::{db_to_port_error, probe};
use crate::repositories::items::{
    ClaimantWrite, ItemCategory as DbItemCategory, ItemDetailsUpdate, ItemRepository, ItemRow,
    ItemSearch, ItemStatus as DbItemStatus, ItemType as DbItemType, StatusChange,
};

/// PostgreSQL-backed implementation of the ItemPort trait
#[derive(Debug, Clone)]
pub struct PostgresItemAdapter {
    repository: ItemRepository,
    pool: PgPool,
}

impl PostgresItemAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ItemRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &ItemRepository {
        &self.repository
    }
}

impl DomainPort for PostgresItemAdapter {}

#[async_trait]
impl HealthCheckable for PostgresItemAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        probe(&self.pool, "postgres-item-adapter").await
    }
}

#[async_trait]
impl ItemPort for PostgresItemAdapter {
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn insert_item(&self, item: &Item) -> Result<(), PortError> {
        debug!("Inserting item");
        self.repository
            .insert(&ItemRow::from(item))
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn get_item(&self, id: ItemId) -> Result<Item, PortError> {
        debug!("Fetching item by ID");
        let row = self
            .repository
            .get_by_id(id.into())
            .await
            .map_err(db_to_port_error)?;
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, PortError> {
        let search = ItemSearch {
            item_type: filter.item_type.map(Into::into),
            category: filter.category.map(Into::into),
            status: filter.status.map(Into::into),
            terms: filter.search_terms(),
        };
        let rows = self.repository.search(&search).await.map_err(db_to_port_error)?;
        debug!(count = rows.len(), "Items found");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(reporter = %reporter))]
    async fn find_by_reporter(&self, reporter: UserId) -> Result<Vec<Item>, PortError> {
        let rows = self
            .repository
            .find_by_reporter(reporter.into())
            .await
            .map_err(db_to_port_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, changes), fields(item_id = %id))]
    async fn update_details(&self, id: ItemId, changes: &ItemChanges) -> Result<Item, PortError> {
        let update = ItemDetailsUpdate {
            category: changes.category.map(Into::into),
            description: changes.description.clone(),
            item_date: changes.date,
            location: changes.location.clone(),
            photo_url: changes.photo_url.clone(),
            contact_info: changes.contact_info.clone(),
            notes: changes.notes.clone(),
        };
        let row = self
            .repository
            .update_details(id.into(), &update)
            .await
            .map_err(db_to_port_error)?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn delete_item(&self, id: ItemId) -> Result<(), PortError> {
        self.repository
            .delete(id.into())
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn transition(
        &self,
        id: ItemId,
        transition: &ClaimTransition,
    ) -> Result<Option<TransitionOutcome>, PortError> {
        let change = StatusChange {
            expected: transition.expected_status().into(),
            target: transition.target_status().into(),
            claimant: match transition.claimant_update() {
                ClaimantUpdate::Assign(claimant) => ClaimantWrite::Assign(claimant.into()),
                ClaimantUpdate::Retain => ClaimantWrite::Retain,
                ClaimantUpdate::Clear => ClaimantWrite::Clear,
            },
        };

        let row = self
            .repository
            .transition(id.into(), &change)
            .await
            .map_err(db_to_port_error)?;
        debug!(applied = row.is_some(), "Status compare-and-swap");

        Ok(row.map(|row| TransitionOutcome {
            previous_claimant: row.previous_claimant.map(UserId::from),
            item: row.item.into(),
        }))
    }
}

// ============================================================================
// Row conversions
// ============================================================================

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: ItemId::from(row.item_id),
            category: row.category.into(),
            description: row.description,
            date: row.item_date,
            location: row.location,
            item_type: row.item_type.into(),
            status: row.status.into(),
            reported_by: UserId::from(row.reported_by),
            claimed_by: row.claimed_by.map(UserId::from),
            photo_url: row.photo_url,
            contact_info: row.contact_info,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        ItemRow {
            item_id: item.id.into(),
            category: item.category.into(),
            description: item.description.clone(),
            item_date: item.date,
            location: item.location.clone(),
            item_type: item.item_type.into(),
            status: item.status.into(),
            reported_by: item.reported_by.into(),
            claimed_by: item.claimed_by.map(Into::into),
            photo_url: item.photo_url.clone(),
            contact_info: item.contact_info.clone(),
            notes: item.notes.clone(),
            created_at: item.created_at,
        }
    }
}

impl From<ItemCategory> for DbItemCategory {
    fn from(category: ItemCategory) -> Self {
        match category {
            ItemCategory::Electronics => DbItemCategory::Electronics,
            ItemCategory::Books => DbItemCategory::Books,
            ItemCategory::Clothing => DbItemCategory::Clothing,
            ItemCategory::Accessories => DbItemCategory::Accessories,
            ItemCategory::Ids => DbItemCategory::Ids,
            ItemCategory::Others => DbItemCategory::Others,
        }
    }
}

impl From<DbItemCategory> for ItemCategory {
    fn from(category: DbItemCategory) -> Self {
        match category {
            DbItemCategory::Electronics => ItemCategory::Electronics,
            DbItemCategory::Books => ItemCategory::Books,
            DbItemCategory::Clothing => ItemCategory::Clothing,
            DbItemCategory::Accessories => ItemCategory::Accessories,
            DbItemCategory::Ids => ItemCategory::Ids,
            DbItemCategory::Others => ItemCategory::Others,
        }
    }
}

impl From<ItemType> for DbItemType {
    fn from(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Lost => DbItemType::Lost,
            ItemType::Found => DbItemType::Found,
        }
    }
}

impl From<DbItemType> for ItemType {
    fn from(item_type: DbItemType) -> Self {
        match item_type {
            DbItemType::Lost => ItemType::Lost,
            DbItemType::Found => ItemType::Found,
        }
    }
}

impl From<ItemStatus> for DbItemStatus {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Available => DbItemStatus::Available,
            ItemStatus::Pending => DbItemStatus::Pending,
            ItemStatus::Claimed => DbItemStatus::Claimed,
        }
    }
}

impl From<DbItemStatus> for ItemStatus {
    fn from(status: DbItemStatus) -> Self {
        match status {
            DbItemStatus::Available => ItemStatus::Available,
            DbItemStatus::Pending => ItemStatus::Pending,
            DbItemStatus::Claimed => ItemStatus::Claimed,
        }
    }
}
