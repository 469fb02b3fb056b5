//! Item Domain Ports
//!
//! This module defines the storage interfaces the item domain needs, so the
//! services in this crate never touch a database directly.
//!
//! # Architecture
//!
//! - **Postgres Adapters**: `infra_db::adapters`, used by the server binary
//! - **Mock Adapters**: the in-memory [`mock`] module, for tests
//!
//! # Claim transitions
//!
//! [`ItemPort::transition`] is a compare-and-swap on the item status. It must
//! check the expected source status and write the target status as one atomic
//! step, so two concurrent claims on one item cannot both succeed. When the
//! guard does not hold (or the item is gone) it returns `Ok(None)`; the caller
//! re-reads the item to tell the two apart.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_items::ports::ItemPort;
//! use std::sync::Arc;
//!
//! let items: Arc<dyn ItemPort> = Arc::new(PostgresItemAdapter::new(pool));
//! let catalog = ItemCatalog::new(items, users);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, IdempotencyKey, ItemId, NotificationId,
    PortError, UserId,
};

use crate::actor::UserSummary;
use crate::idempotency::IdempotencyRecord;
use crate::item::{Item, ItemChanges};
use crate::notification::Notification;
use crate::query::ItemFilter;
use crate::workflow::ClaimTransition;

/// Result of a successful status compare-and-swap
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// The item after the transition
    pub item: Item,
    /// `claimed_by` before the transition
    pub previous_claimant: Option<UserId>,
}

/// Storage for item reports
#[async_trait]
pub trait ItemPort: DomainPort + HealthCheckable {
    /// Persists a newly reported item
    async fn insert_item(&self, item: &Item) -> Result<(), PortError>;

    /// Retrieves an item by ID, or `PortError::NotFound`
    async fn get_item(&self, id: ItemId) -> Result<Item, PortError>;

    /// Items matching the filter, newest first
    async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, PortError>;

    /// Items reported by `reporter`, newest first
    async fn find_by_reporter(&self, reporter: UserId) -> Result<Vec<Item>, PortError>;

    /// Writes the provided descriptive fields
    ///
    /// `changes` is expected in [`ItemChanges::normalized`] form. Status and
    /// claimant are never written here.
    async fn update_details(&self, id: ItemId, changes: &ItemChanges) -> Result<Item, PortError>;

    /// Removes an item regardless of status
    async fn delete_item(&self, id: ItemId) -> Result<(), PortError>;

    /// Atomically applies a claim transition if the item is in the expected status
    async fn transition(
        &self,
        id: ItemId,
        transition: &ClaimTransition,
    ) -> Result<Option<TransitionOutcome>, PortError>;
}

/// Storage for user notifications
#[async_trait]
pub trait NotificationPort: DomainPort + HealthCheckable {
    async fn create_notification(&self, notification: &Notification) -> Result<(), PortError>;

    /// Notifications addressed to `user`, newest first
    async fn find_for_user(&self, user: UserId) -> Result<Vec<Notification>, PortError>;

    /// Sets `read` on a notification addressed to `user`
    ///
    /// Returns `PortError::NotFound` if the notification does not exist or
    /// belongs to another user.
    async fn mark_read(&self, id: NotificationId, user: UserId) -> Result<Notification, PortError>;

    /// Sets `read` on every unread notification of `user`, returning the count
    async fn mark_all_read(&self, user: UserId) -> Result<u64, PortError>;

    /// Deletes read notifications created before `cutoff`
    async fn purge_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError>;
}

/// Read-only view of the users known to the identity provider
#[async_trait]
pub trait UserDirectoryPort: DomainPort + HealthCheckable {
    /// Display projections for the given users; unknown ids are skipped
    async fn find_summaries(&self, ids: &[UserId]) -> Result<Vec<UserSummary>, PortError>;
}

/// Storage for claim idempotency records
#[async_trait]
pub trait IdempotencyPort: DomainPort + HealthCheckable {
    async fn lookup(
        &self,
        key: IdempotencyKey,
        user: UserId,
    ) -> Result<Option<IdempotencyRecord>, PortError>;

    /// Stores a record; an existing record for the same key and user is kept
    async fn store(&self, record: &IdempotencyRecord) -> Result<(), PortError>;

    /// Deletes records created before `cutoff`
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError>;
}

/// In-memory adapters for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::AdapterHealth;
    use crate::query::sort_newest_first;

    fn healthy(adapter_id: &str) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some("Mock adapter always healthy".to_string()),
            checked_at: Utc::now(),
        }
    }

    /// In-memory mock implementation of ItemPort
    ///
    /// Transitions hold the write lock across check and set.
    #[derive(Debug, Default)]
    pub struct MockItemPort {
        items: Arc<RwLock<HashMap<ItemId, Item>>>,
    }

    impl MockItemPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with items for testing
        pub fn with_items(items: Vec<Item>) -> Self {
            let items = items.into_iter().map(|item| (item.id, item)).collect();
            Self {
                items: Arc::new(RwLock::new(items)),
            }
        }

        pub async fn len(&self) -> usize {
            self.items.read().await.len()
        }
    }

    impl DomainPort for MockItemPort {}

    #[async_trait]
    impl HealthCheckable for MockItemPort {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("mock-item-port")
        }
    }

    #[async_trait]
    impl ItemPort for MockItemPort {
        async fn insert_item(&self, item: &Item) -> Result<(), PortError> {
            let mut items = self.items.write().await;
            if items.contains_key(&item.id) {
                return Err(PortError::conflict(format!("Item {} already exists", item.id)));
            }
            items.insert(item.id, item.clone());
            Ok(())
        }

        async fn get_item(&self, id: ItemId) -> Result<Item, PortError> {
            self.items
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Item", id))
        }

        async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, PortError> {
            let mut results: Vec<_> = self
                .items
                .read()
                .await
                .values()
                .filter(|item| filter.matches(item))
                .cloned()
                .collect();
            sort_newest_first(&mut results);
            Ok(results)
        }

        async fn find_by_reporter(&self, reporter: UserId) -> Result<Vec<Item>, PortError> {
            let mut results: Vec<_> = self
                .items
                .read()
                .await
                .values()
                .filter(|item| item.is_reported_by(reporter))
                .cloned()
                .collect();
            sort_newest_first(&mut results);
            Ok(results)
        }

        async fn update_details(&self, id: ItemId, changes: &ItemChanges) -> Result<Item, PortError> {
            let mut items = self.items.write().await;
            let item = items
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Item", id))?;
            item.apply_changes(changes)
                .map_err(|e| PortError::validation(e.to_string()))?;
            Ok(item.clone())
        }

        async fn delete_item(&self, id: ItemId) -> Result<(), PortError> {
            self.items
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Item", id))
        }

        async fn transition(
            &self,
            id: ItemId,
            transition: &ClaimTransition,
        ) -> Result<Option<TransitionOutcome>, PortError> {
            let mut items = self.items.write().await;
            let Some(item) = items.get_mut(&id) else {
                return Ok(None);
            };
            let previous_claimant = item.claimed_by;
            if item.apply(transition).is_err() {
                return Ok(None);
            }
            Ok(Some(TransitionOutcome {
                item: item.clone(),
                previous_claimant,
            }))
        }
    }

    /// In-memory mock implementation of NotificationPort
    ///
    /// `set_failing(true)` makes writes fail, to exercise the
    /// transition-succeeded-but-notification-failed path. `set_write_delay`
    /// holds every write for the given time.
    #[derive(Debug, Default)]
    pub struct MockNotificationPort {
        notifications: Arc<RwLock<Vec<Notification>>>,
        failing: AtomicBool,
        write_delay_ms: AtomicU64,
    }

    impl MockNotificationPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn set_write_delay(&self, delay: std::time::Duration) {
            let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            self.write_delay_ms.store(millis, Ordering::SeqCst);
        }

        /// Every stored notification, in insertion order
        pub async fn all(&self) -> Vec<Notification> {
            self.notifications.read().await.clone()
        }
    }

    impl DomainPort for MockNotificationPort {}

    #[async_trait]
    impl HealthCheckable for MockNotificationPort {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("mock-notification-port")
        }
    }

    #[async_trait]
    impl NotificationPort for MockNotificationPort {
        async fn create_notification(&self, notification: &Notification) -> Result<(), PortError> {
            let delay = self.write_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::connection("notification store unavailable"));
            }
            self.notifications.write().await.push(notification.clone());
            Ok(())
        }

        async fn find_for_user(&self, user: UserId) -> Result<Vec<Notification>, PortError> {
            let mut results: Vec<_> = self
                .notifications
                .read()
                .await
                .iter()
                .filter(|n| n.user_id == user)
                .cloned()
                .collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
            Ok(results)
        }

        async fn mark_read(&self, id: NotificationId, user: UserId) -> Result<Notification, PortError> {
            let mut notifications = self.notifications.write().await;
            let notification = notifications
                .iter_mut()
                .find(|n| n.id == id && n.user_id == user)
                .ok_or_else(|| PortError::not_found("Notification", id))?;
            notification.mark_read();
            Ok(notification.clone())
        }

        async fn mark_all_read(&self, user: UserId) -> Result<u64, PortError> {
            let mut updated = 0;
            for notification in self.notifications.write().await.iter_mut() {
                if notification.user_id == user && !notification.read {
                    notification.mark_read();
                    updated += 1;
                }
            }
            Ok(updated)
        }

        async fn purge_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError> {
            let mut notifications = self.notifications.write().await;
            let before = notifications.len();
            notifications.retain(|n| !(n.read && n.created_at < cutoff));
            Ok((before - notifications.len()) as u64)
        }
    }

    /// In-memory mock implementation of UserDirectoryPort
    #[derive(Debug, Default)]
    pub struct MockUserDirectory {
        users: Arc<RwLock<HashMap<UserId, UserSummary>>>,
    }

    impl MockUserDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_users(users: Vec<UserSummary>) -> Self {
            let users = users.into_iter().map(|user| (user.id, user)).collect();
            Self {
                users: Arc::new(RwLock::new(users)),
            }
        }

        pub async fn add_user(&self, user: UserSummary) {
            self.users.write().await.insert(user.id, user);
        }
    }

    impl DomainPort for MockUserDirectory {}

    #[async_trait]
    impl HealthCheckable for MockUserDirectory {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("mock-user-directory")
        }
    }

    #[async_trait]
    impl UserDirectoryPort for MockUserDirectory {
        async fn find_summaries(&self, ids: &[UserId]) -> Result<Vec<UserSummary>, PortError> {
            let users = self.users.read().await;
            Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
        }
    }

    /// In-memory mock implementation of IdempotencyPort
    #[derive(Debug, Default)]
    pub struct MockIdempotencyPort {
        records: Arc<RwLock<HashMap<(IdempotencyKey, UserId), IdempotencyRecord>>>,
    }

    impl MockIdempotencyPort {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockIdempotencyPort {}

    #[async_trait]
    impl HealthCheckable for MockIdempotencyPort {
        async fn health_check(&self) -> HealthCheckResult {
            healthy("mock-idempotency-port")
        }
    }

    #[async_trait]
    impl IdempotencyPort for MockIdempotencyPort {
        async fn lookup(
            &self,
            key: IdempotencyKey,
            user: UserId,
        ) -> Result<Option<IdempotencyRecord>, PortError> {
            Ok(self.records.read().await.get(&(key, user)).cloned())
        }

        async fn store(&self, record: &IdempotencyRecord) -> Result<(), PortError> {
            self.records
                .write()
                .await
                .entry((record.key, record.user_id))
                .or_insert_with(|| record.clone());
            Ok(())
        }

        async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError> {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|_, record| record.created_at >= cutoff);
            Ok((before - records.len()) as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::{MockItemPort, MockNotificationPort};
    use crate::item::{ItemCategory, ItemStatus, ItemType, NewItem};
    use crate::notification::NotificationType;
    use chrono::NaiveDate;

    fn phone(reporter: UserId) -> Item {
        Item::report(
            reporter,
            NewItem {
                category: ItemCategory::Electronics,
                description: "Cracked phone in a blue case".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 4, 8).unwrap(),
                location: "Gym lockers".to_string(),
                item_type: ItemType::Found,
                photo_url: None,
                contact_info: None,
                notes: None,
            },
        )
    }

    #[tokio::test]
    async fn test_mock_transition_is_guarded() {
        let item = phone(UserId::new());
        let port = MockItemPort::with_items(vec![item.clone()]);
        let claimant = UserId::new();

        let outcome = port
            .transition(item.id, &ClaimTransition::Submit { claimant })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.item.status, ItemStatus::Pending);
        assert_eq!(outcome.previous_claimant, None);

        let second = port
            .transition(item.id, &ClaimTransition::Submit { claimant: UserId::new() })
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(port.get_item(item.id).await.unwrap().claimed_by, Some(claimant));
    }

    #[tokio::test]
    async fn test_mock_transition_on_missing_item() {
        let port = MockItemPort::new();
        let outcome = port.transition(ItemId::new(), &ClaimTransition::Approve).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_mock_mark_read_is_scoped_to_recipient() {
        let port = MockNotificationPort::new();
        let recipient = UserId::new();
        let notification = Notification::new(recipient, NotificationType::Info, "t", "m", None);
        port.create_notification(&notification).await.unwrap();

        let err = port.mark_read(notification.id, UserId::new()).await.unwrap_err();
        assert!(err.is_not_found());

        let read = port.mark_read(notification.id, recipient).await.unwrap();
        assert!(read.read);
        assert_eq!(port.mark_all_read(recipient).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_purge_keeps_unread() {
        let port = MockNotificationPort::new();
        let user = UserId::new();
        let unread = Notification::new(user, NotificationType::Info, "a", "a", None);
        let read = Notification::new(user, NotificationType::Info, "b", "b", None);
        port.create_notification(&unread).await.unwrap();
        port.create_notification(&read).await.unwrap();
        port.mark_read(read.id, user).await.unwrap();

        let purged = port.purge_read_before(Utc::now() + chrono::Duration::seconds(1)).await.unwrap();
        assert_eq!(purged, 1);
        assert_eq!(port.find_for_user(user).await.unwrap(), vec![unread]);
    }

    #[tokio::test]
    async fn test_mock_port_health_check() {
        let port = MockItemPort::new();
        let result = port.health_check().await;
        assert_eq!(result.status, core_kernel::AdapterHealth::Healthy);
    }
}
